use serde::Serialize;
use thiserror::Error;

use crate::model::Question;
use crate::sampler::{RandomSource, sample_without_replacement, shuffle_in_place};

/// Number of options shown per question.
pub const DEFAULT_DISPLAY_SIZE: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OptionError {
    #[error("invalid correct index {index} for {len} option(s)")]
    InvalidCorrectIndex { index: usize, len: usize },
}

/// The options actually shown for a question in one session.
///
/// Frozen once built: `correct_index` is the only reliable way to find the
/// right answer, since option texts are not guaranteed to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    options: Vec<String>,
    correct_index: Option<usize>,
}

impl DisplayOptions {
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Position of the correct option; `None` for a question with no options.
    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        self.correct_index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// `false` when there is no valid answer to pick.
    #[must_use]
    pub fn is_playable(&self) -> bool {
        self.correct_index.is_some()
    }

    #[must_use]
    pub fn correct_option(&self) -> Option<&str> {
        self.correct_index
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }

    /// True iff `answer` points at the correct option.
    #[must_use]
    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        matches!((answer, self.correct_index), (Some(a), Some(c)) if a == c)
    }
}

/// Pick the correct option plus up to `display_size - 1` random distractors
/// and shuffle them, tracking where the correct option lands.
///
/// A `display_size` of 0 is treated as 1. Questions with fewer options than
/// `display_size` show all of them. An empty option list yields an empty,
/// unplayable set rather than an error.
///
/// # Errors
///
/// Returns `OptionError::InvalidCorrectIndex` if `question.correct_answer` is
/// out of range for a non-empty option list.
pub fn build_display_options(
    question: &Question,
    display_size: usize,
    rng: &mut impl RandomSource,
) -> Result<DisplayOptions, OptionError> {
    let len = question.options.len();
    if len == 0 {
        return Ok(DisplayOptions {
            options: Vec::new(),
            correct_index: None,
        });
    }

    let correct = question.correct_answer;
    if correct >= len {
        return Err(OptionError::InvalidCorrectIndex {
            index: correct,
            len,
        });
    }

    // Work on source indices so duplicate texts cannot confuse the lookup.
    let distractors: Vec<usize> = (0..len).filter(|&i| i != correct).collect();
    let wanted = display_size.max(1) - 1;
    let mut picked = sample_without_replacement(&distractors, wanted, rng);
    picked.push(correct);
    shuffle_in_place(&mut picked, rng);

    let correct_index = picked.iter().position(|&i| i == correct);
    let options = picked
        .into_iter()
        .map(|i| question.options[i].clone())
        .collect();

    Ok(DisplayOptions {
        options,
        correct_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{RngSource, ScriptedSource};
    use std::collections::HashSet;

    fn question(n: usize, correct: usize) -> Question {
        Question::new(
            "q",
            "Which?",
            (0..n).map(|i| format!("option {i}")).collect(),
            correct,
        )
    }

    #[test]
    fn correct_index_points_at_correct_text() {
        for n in 1..=9 {
            for correct in 0..n {
                for seed in 0..10 {
                    let q = question(n, correct);
                    let shown =
                        build_display_options(&q, DEFAULT_DISPLAY_SIZE, &mut RngSource::seeded(seed))
                            .unwrap();
                    let idx = shown.correct_index().unwrap();
                    assert_eq!(shown.options()[idx], q.options[correct]);
                    assert_eq!(shown.len(), n.min(DEFAULT_DISPLAY_SIZE));
                }
            }
        }
    }

    #[test]
    fn seven_options_yield_four_distinct_members() {
        let q = question(7, 3);
        let shown = build_display_options(&q, 4, &mut RngSource::seeded(99)).unwrap();
        assert_eq!(shown.len(), 4);
        let unique: HashSet<_> = shown.options().iter().collect();
        assert_eq!(unique.len(), 4);
        assert!(shown.options().iter().all(|o| q.options.contains(o)));
        assert_eq!(shown.correct_option(), Some("option 3"));
    }

    #[test]
    fn duplicate_texts_are_tracked_by_position() {
        let q = Question::new("q", "Same?", vec!["x".into(), "x".into()], 1);
        let shown = build_display_options(&q, 4, &mut ScriptedSource::new(vec![0])).unwrap();
        assert_eq!(shown.len(), 2);
        assert!(shown.is_playable());
    }

    #[test]
    fn scripted_order_moves_correct_index() {
        // Two options, correct = 0. Distractors [1] shuffled (no-op), then
        // [1, 0] shuffled with j=0 at i=1 -> [0, 1].
        let q = question(2, 0);
        let shown = build_display_options(&q, 4, &mut ScriptedSource::new(vec![0])).unwrap();
        assert_eq!(shown.options(), ["option 0", "option 1"]);
        assert_eq!(shown.correct_index(), Some(0));

        // Identity script keeps [1, 0] -> correct moves to position 1.
        let shown = build_display_options(&q, 4, &mut ScriptedSource::identity()).unwrap();
        assert_eq!(shown.options(), ["option 1", "option 0"]);
        assert_eq!(shown.correct_index(), Some(1));
    }

    #[test]
    fn empty_options_are_unplayable() {
        let q = question(0, 0);
        let shown = build_display_options(&q, 4, &mut RngSource::seeded(1)).unwrap();
        assert!(shown.is_empty());
        assert_eq!(shown.correct_index(), None);
        assert!(!shown.is_playable());
        assert!(!shown.is_correct(None));
        assert!(!shown.is_correct(Some(0)));
    }

    #[test]
    fn out_of_range_correct_index_fails() {
        let q = question(3, 3);
        let err = build_display_options(&q, 4, &mut RngSource::seeded(1)).unwrap_err();
        assert_eq!(err, OptionError::InvalidCorrectIndex { index: 3, len: 3 });
    }

    #[test]
    fn zero_display_size_still_shows_correct_option() {
        let q = question(5, 2);
        let shown = build_display_options(&q, 0, &mut RngSource::seeded(3)).unwrap();
        assert_eq!(shown.options(), ["option 2"]);
        assert_eq!(shown.correct_index(), Some(0));
    }

    #[test]
    fn is_correct_requires_exact_match() {
        let q = question(4, 0);
        let shown = build_display_options(&q, 4, &mut RngSource::seeded(5)).unwrap();
        let c = shown.correct_index().unwrap();
        assert!(shown.is_correct(Some(c)));
        assert!(!shown.is_correct(Some((c + 1) % 4)));
        assert!(!shown.is_correct(None));
    }
}
