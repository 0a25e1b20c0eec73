use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::ids::{CategoryId, QuestionId, TopicId};

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question as authored in the content set.
///
/// `options` is the full pool (typically 7 entries); only a subset is shown in
/// a session. `correct_answer` indexes into `options` and is not checked on
/// load: malformed data surfaces when a session tries to display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
    ) -> Self {
        Self {
            id: QuestionId::new(id),
            text: text.into(),
            options,
            correct_answer,
            explanation: None,
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Text of the correct option, if `correct_answer` is in range.
    #[must_use]
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_answer).map(String::as_str)
    }
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// A named pool of questions; a Quiz session draws from exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuizCategory {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: CategoryId::new(id),
            name: name.into(),
            description: String::new(),
            questions,
        }
    }
}

//
// ─── CONTENT ISSUES ────────────────────────────────────────────────────────────
//

/// Authoring problems found by [`ContentData::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentIssue {
    EmptyCategory { category: CategoryId },
    EmptyCategoryName { category: CategoryId },
    EmptyQuestionText { question: QuestionId },
    TooFewOptions { question: QuestionId, count: usize },
    CorrectAnswerOutOfRange { question: QuestionId, index: usize, len: usize },
    DuplicateOption { question: QuestionId, option: String },
    DuplicateQuestionId { question: QuestionId },
}

impl std::fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCategory { category } => write!(f, "category {category} has no questions"),
            Self::EmptyCategoryName { category } => write!(f, "category {category} has no name"),
            Self::EmptyQuestionText { question } => write!(f, "question {question} has no text"),
            Self::TooFewOptions { question, count } => {
                write!(f, "question {question} has only {count} option(s)")
            }
            Self::CorrectAnswerOutOfRange {
                question,
                index,
                len,
            } => write!(
                f,
                "question {question} marks option {index} correct but has {len} option(s)"
            ),
            Self::DuplicateOption { question, option } => {
                write!(f, "question {question} repeats option {option:?}")
            }
            Self::DuplicateQuestionId { question } => {
                write!(f, "question id {question} is used more than once")
            }
        }
    }
}

//
// ─── STUDY CONTENT ─────────────────────────────────────────────────────────────
//

/// One page of reading material inside a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyNote {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub order: u32,
}

/// A topic of study notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyTopic {
    pub id: TopicId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: Vec<StudyNote>,
}

//
// ─── CONTENT SET ───────────────────────────────────────────────────────────────
//

/// Read-only content supplied by the content provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub quiz_categories: Vec<QuizCategory>,
    #[serde(default)]
    pub topics: Vec<StudyTopic>,
}

impl ContentData {
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&QuizCategory> {
        self.quiz_categories.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn topic(&self, id: &TopicId) -> Option<&StudyTopic> {
        self.topics.iter().find(|t| &t.id == id)
    }

    /// Total number of questions across every category.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.quiz_categories.iter().map(|c| c.questions.len()).sum()
    }

    /// Collects authoring problems without rejecting the content.
    #[must_use]
    pub fn validate(&self) -> Vec<ContentIssue> {
        let mut issues = Vec::new();
        let mut seen_ids = HashSet::new();

        for category in &self.quiz_categories {
            if category.name.trim().is_empty() {
                issues.push(ContentIssue::EmptyCategoryName {
                    category: category.id.clone(),
                });
            }
            if category.questions.is_empty() {
                issues.push(ContentIssue::EmptyCategory {
                    category: category.id.clone(),
                });
            }

            for question in &category.questions {
                if !seen_ids.insert(question.id.clone()) {
                    issues.push(ContentIssue::DuplicateQuestionId {
                        question: question.id.clone(),
                    });
                }
                validate_question(question, &mut issues);
            }
        }

        issues
    }
}

fn validate_question(question: &Question, issues: &mut Vec<ContentIssue>) {
    if question.text.trim().is_empty() {
        issues.push(ContentIssue::EmptyQuestionText {
            question: question.id.clone(),
        });
    }
    if question.options.len() < 2 {
        issues.push(ContentIssue::TooFewOptions {
            question: question.id.clone(),
            count: question.options.len(),
        });
    }
    if question.correct_answer >= question.options.len() {
        issues.push(ContentIssue::CorrectAnswerOutOfRange {
            question: question.id.clone(),
            index: question.correct_answer,
            len: question.options.len(),
        });
    }

    let mut seen = HashSet::new();
    for option in &question.options {
        if !seen.insert(option.trim()) {
            issues.push(ContentIssue::DuplicateOption {
                question: question.id.clone(),
                option: option.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("opt {i}")).collect()
    }

    #[test]
    fn deserializes_camel_case_content() {
        let json = r#"{
            "version": "1.0",
            "lastUpdated": "2024-01-01",
            "quizCategories": [{
                "id": "adab",
                "name": "Adab",
                "description": "Manners",
                "questions": [{
                    "id": "q1",
                    "question": "Pick A",
                    "options": ["A", "B"],
                    "correctAnswer": 0,
                    "explanation": "because"
                }]
            }],
            "topics": []
        }"#;

        let content: ContentData = serde_json::from_str(json).unwrap();
        assert_eq!(content.version, "1.0");
        let category = content.category(&CategoryId::new("adab")).unwrap();
        assert_eq!(category.questions[0].text, "Pick A");
        assert_eq!(category.questions[0].correct_option(), Some("A"));
        assert_eq!(category.questions[0].explanation.as_deref(), Some("because"));
        assert_eq!(content.question_count(), 1);
    }

    #[test]
    fn correct_option_is_none_when_out_of_range() {
        let question = Question::new("q", "text", opts(2), 5);
        assert_eq!(question.correct_option(), None);
    }

    #[test]
    fn validate_reports_authoring_problems() {
        let content = ContentData {
            quiz_categories: vec![
                QuizCategory::new(
                    "a",
                    "A",
                    vec![
                        Question::new("q1", "ok", opts(4), 1),
                        Question::new("q1", " ", vec!["x".into()], 3),
                        Question::new("q3", "dup", vec!["same".into(), "same".into()], 0),
                    ],
                ),
                QuizCategory::new("empty", "", Vec::new()),
            ],
            ..ContentData::default()
        };

        let issues = content.validate();
        assert!(issues.contains(&ContentIssue::DuplicateQuestionId {
            question: QuestionId::new("q1")
        }));
        assert!(issues.contains(&ContentIssue::EmptyQuestionText {
            question: QuestionId::new("q1")
        }));
        assert!(issues.contains(&ContentIssue::TooFewOptions {
            question: QuestionId::new("q1"),
            count: 1
        }));
        assert!(issues.contains(&ContentIssue::CorrectAnswerOutOfRange {
            question: QuestionId::new("q1"),
            index: 3,
            len: 1
        }));
        assert!(issues.contains(&ContentIssue::DuplicateOption {
            question: QuestionId::new("q3"),
            option: "same".into()
        }));
        assert!(issues.contains(&ContentIssue::EmptyCategory {
            category: CategoryId::new("empty")
        }));
        assert!(issues.contains(&ContentIssue::EmptyCategoryName {
            category: CategoryId::new("empty")
        }));
    }

    #[test]
    fn valid_content_has_no_issues() {
        let content = ContentData {
            quiz_categories: vec![QuizCategory::new(
                "a",
                "A",
                vec![Question::new("q1", "ok", opts(7), 6)],
            )],
            ..ContentData::default()
        };
        assert!(content.validate().is_empty());
    }
}
