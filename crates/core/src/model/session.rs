use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AnswerMap, Question, QuizId};
use crate::scoring;

/// Persisted detail of one quiz attempt, in progress or completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    pub quiz_id: QuizId,
    pub questions: Vec<Question>,
    pub user_answers: AnswerMap,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a fresh, not yet completed attempt.
    #[must_use]
    pub fn start(quiz_id: QuizId, questions: Vec<Question>, start_time: DateTime<Utc>) -> Self {
        Self {
            quiz_id,
            questions,
            user_answers: AnswerMap::new(),
            start_time,
            completed: false,
            score: None,
            end_time: None,
        }
    }

    /// Mark the attempt finished, scoring the recorded answers.
    pub fn finalize(&mut self, end_time: DateTime<Utc>) -> u32 {
        let score = scoring::score(&self.questions, &self.user_answers);
        self.completed = true;
        self.score = Some(score);
        self.end_time = Some(end_time);
        score
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }
}
