use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AnswerMap, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    InProgress,
    Completed,
}

/// Per-question outcome captured at completion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSnapshot {
    pub question: String,
    pub selected: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Summary of the most recent completed attempt for one quiz id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizProgress {
    pub status: ProgressStatus,
    pub last_attempt: DateTime<Utc>,
    pub score: u32,
    pub total_questions: u32,
    pub answers: Vec<AnswerSnapshot>,
}

impl QuizProgress {
    /// Build a completed record from the questions and answers of an attempt.
    #[must_use]
    pub fn completed(
        questions: &[Question],
        answers: &AnswerMap,
        score: u32,
        last_attempt: DateTime<Utc>,
    ) -> Self {
        let answers = questions
            .iter()
            .enumerate()
            .map(|(idx, q)| {
                let selected = answers.get(idx).map(str::to_owned);
                let is_correct = selected.as_deref().is_some_and(|a| q.is_correct(a));
                AnswerSnapshot {
                    question: q.question().to_owned(),
                    selected,
                    correct_answer: q.correct_answer().to_owned(),
                    is_correct,
                }
            })
            .collect();

        Self {
            status: ProgressStatus::Completed,
            last_attempt,
            score,
            total_questions: u32::try_from(questions.len()).unwrap_or(u32::MAX),
            answers,
        }
    }
}
