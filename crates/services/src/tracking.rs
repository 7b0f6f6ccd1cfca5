use chrono::{DateTime, Utc};
use quiz_core::model::{AnswerSnapshot, ProgressStatus, QuizId, QuizProgress, QuizSession};
use storage::{ProgressStore, SessionStore};

use crate::error::TrackingError;

/// One row of the attempt history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionListItem {
    pub quiz_id: QuizId,
    pub status: ProgressStatus,
    pub score: Option<u32>,
    pub total: usize,
    pub answered: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionListItem {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        Self {
            quiz_id: session.quiz_id.clone(),
            status: if session.completed {
                ProgressStatus::Completed
            } else {
                ProgressStatus::InProgress
            },
            score: session.score,
            total: session.total_questions(),
            answered: session.user_answers.len(),
            started_at: session.start_time,
            completed_at: session.end_time,
        }
    }
}

/// Read side over stored attempts: history listing and per-quiz review.
#[derive(Clone)]
pub struct TrackingService {
    progress: ProgressStore,
    sessions: SessionStore,
}

impl TrackingService {
    #[must_use]
    pub fn new(progress: ProgressStore, sessions: SessionStore) -> Self {
        Self { progress, sessions }
    }

    /// Every stored attempt, most recently started first.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::Storage` on backend failures.
    pub async fn list_sessions(&self) -> Result<Vec<SessionListItem>, TrackingError> {
        let mut items: Vec<SessionListItem> = self
            .sessions
            .list_all()
            .await?
            .map(|s| SessionListItem::from_session(&s))
            .collect();
        items.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(items)
    }

    /// # Errors
    ///
    /// Returns `TrackingError::Storage` on backend failures.
    pub async fn session(&self, quiz_id: &QuizId) -> Result<Option<QuizSession>, TrackingError> {
        Ok(self.sessions.get(quiz_id).await?)
    }

    /// # Errors
    ///
    /// Returns `TrackingError::Storage` on backend failures.
    pub async fn progress(&self, quiz_id: &QuizId) -> Result<Option<QuizProgress>, TrackingError> {
        Ok(self.progress.get(quiz_id).await?)
    }

    /// Per-question outcome of a completed attempt; `None` while in progress.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::Storage` on backend failures.
    pub async fn review(
        &self,
        quiz_id: &QuizId,
    ) -> Result<Option<Vec<AnswerSnapshot>>, TrackingError> {
        let Some(session) = self.sessions.get(quiz_id).await? else {
            return Ok(None);
        };
        if !session.completed {
            return Ok(None);
        }
        let score = session.score.unwrap_or(0);
        let end = session.end_time.unwrap_or(session.start_time);
        let snapshot =
            QuizProgress::completed(&session.questions, &session.user_answers, score, end);
        Ok(Some(snapshot.answers))
    }

    /// Look up by the textual id shown in the history table.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::InvalidQuizId` for ids that do not parse.
    pub fn parse_quiz_id(raw: &str) -> Result<QuizId, TrackingError> {
        Ok(QuizId::parse(raw)?.into())
    }

    /// Remove every progress record. Sessions stay.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::Storage` on backend failures.
    pub async fn reset_progress(&self) -> Result<(), TrackingError> {
        Ok(self.progress.clear().await?)
    }
}
