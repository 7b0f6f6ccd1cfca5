//! Full attempt detail, one key per quiz id.

use std::sync::Arc;

use quiz_core::model::{QuizId, QuizSession};
use tracing::debug;

use crate::repository::{KeyValueStore, StorageError};

pub const SESSION_KEY_PREFIX: &str = "quizSession-";

#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    #[must_use]
    pub fn key_for(quiz_id: &QuizId) -> String {
        format!("{SESSION_KEY_PREFIX}{quiz_id}")
    }

    /// Load the session stored for `quiz_id`; corrupt entries read as `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend read fails.
    pub async fn get(&self, quiz_id: &QuizId) -> Result<Option<QuizSession>, StorageError> {
        let key = Self::key_for(quiz_id);
        Ok(self
            .kv
            .get(&key)
            .await?
            .and_then(|raw| parse_session(&key, &raw)))
    }

    /// Replace the stored session for `quiz_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn set(&self, quiz_id: &QuizId, session: &QuizSession) -> Result<(), StorageError> {
        let raw = serde_json::to_string(session)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(&Self::key_for(quiz_id), &raw).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn remove(&self, quiz_id: &QuizId) -> Result<(), StorageError> {
        self.kv.remove(&Self::key_for(quiz_id)).await
    }

    /// Snapshot every stored session.
    ///
    /// Values are read now; parsing happens as the listing is iterated and
    /// entries that fail to parse are skipped. Call again to see later writes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn list_all(&self) -> Result<SessionListing, StorageError> {
        let mut raw = Vec::new();
        for key in self.kv.keys().await? {
            if !key.starts_with(SESSION_KEY_PREFIX) {
                continue;
            }
            // A key can vanish between `keys()` and `get()`; treat it as absent.
            if let Some(value) = self.kv.get(&key).await? {
                raw.push((key, value));
            }
        }
        Ok(SessionListing {
            raw: raw.into_iter(),
        })
    }
}

/// Lazily parsed sessions in the backend's key order.
pub struct SessionListing {
    raw: std::vec::IntoIter<(String, String)>,
}

impl Iterator for SessionListing {
    type Item = QuizSession;

    fn next(&mut self) -> Option<Self::Item> {
        self.raw
            .by_ref()
            .find_map(|(key, value)| parse_session(&key, &value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.raw.len()))
    }
}

fn parse_session(key: &str, raw: &str) -> Option<QuizSession> {
    match serde_json::from_str(raw) {
        Ok(session) => Some(session),
        Err(err) => {
            debug!(key, error = %err, "skipping malformed session record");
            None
        }
    }
}
