use chrono::{DateTime, Utc};
use quiz_core::model::{AnswerSnapshot, QuizId};

/// Read-only outcome of a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResults {
    pub quiz_id: QuizId,
    pub category_name: Option<String>,
    pub score: u32,
    pub total: u32,
    pub accuracy_percent: u32,
    /// `mm:ss`
    pub elapsed: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub review: Vec<AnswerSnapshot>,
}

impl QuizResults {
    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.total.saturating_sub(self.score)
    }
}
