use quiz_core::model::{StudyNote, StudyTopic};
use tracing::debug;

/// Page-by-page reading through one topic's notes.
#[derive(Debug, Clone, Default)]
pub struct StudySession {
    topic: Option<StudyTopic>,
    current: usize,
}

impl StudySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `topic` at its first note. Notes are ordered by `order`.
    pub fn start(&mut self, topic: &StudyTopic) {
        let mut topic = topic.clone();
        topic.notes.sort_by_key(|n| n.order);
        debug!(topic = %topic.id, notes = topic.notes.len(), "study started");
        self.topic = Some(topic);
        self.current = 0;
    }

    pub fn go_to_next(&mut self) {
        if self.can_go_next() {
            self.current += 1;
        }
    }

    pub fn go_to_previous(&mut self) {
        if self.can_go_previous() {
            self.current -= 1;
        }
    }

    pub fn reset(&mut self) {
        self.topic = None;
        self.current = 0;
    }

    #[must_use]
    pub fn is_studying(&self) -> bool {
        self.topic.is_some()
    }

    #[must_use]
    pub fn topic(&self) -> Option<&StudyTopic> {
        self.topic.as_ref()
    }

    #[must_use]
    pub fn current_note(&self) -> Option<&StudyNote> {
        self.topic.as_ref().and_then(|t| t.notes.get(self.current))
    }

    #[must_use]
    pub fn current_note_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total_notes(&self) -> usize {
        self.topic.as_ref().map_or(0, |t| t.notes.len())
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.current + 1 < self.total_notes()
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.current > 0
    }

    /// Percentage of the topic reached, counting the current note. 0 with no notes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        let total = self.total_notes();
        if total == 0 {
            return 0.0;
        }
        (self.current + 1) as f64 / total as f64 * 100.0
    }
}
