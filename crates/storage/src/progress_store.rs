//! Summary of the latest completed attempt per quiz, kept under one key.

use std::collections::BTreeMap;
use std::sync::Arc;

use quiz_core::model::{QuizId, QuizProgress};
use serde_json::Value;
use tracing::debug;

use crate::repository::{KeyValueStore, StorageError};

/// Key holding the whole `quiz id -> progress` map.
pub const PROGRESS_KEY: &str = "quizProgress";

pub type ProgressMap = BTreeMap<QuizId, QuizProgress>;

/// The stored map with each entry still undecoded.
type RawProgressMap = BTreeMap<String, Value>;

#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    async fn load_raw(&self) -> Result<RawProgressMap, StorageError> {
        let Some(raw) = self.kv.get(PROGRESS_KEY).await? else {
            return Ok(RawProgressMap::new());
        };
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(err) => {
                debug!(error = %err, "ignoring malformed progress map");
                Ok(RawProgressMap::new())
            }
        }
    }

    /// Every stored progress record.
    ///
    /// Entries that fail to decode are skipped; an absent or unreadable map
    /// comes back empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend read fails.
    pub async fn get_all(&self) -> Result<ProgressMap, StorageError> {
        Ok(self
            .load_raw()
            .await?
            .into_iter()
            .filter_map(|(key, value)| decode_entry(&key, value))
            .collect())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend read fails.
    pub async fn get(&self, quiz_id: &QuizId) -> Result<Option<QuizProgress>, StorageError> {
        Ok(self
            .load_raw()
            .await?
            .remove(quiz_id.as_str())
            .and_then(|value| decode_entry(quiz_id.as_str(), value))
            .map(|(_, progress)| progress))
    }

    /// Replace the record for `quiz_id`, leaving other entries as they are,
    /// undecodable ones included.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the map cannot be read, encoded or written.
    pub async fn set(&self, quiz_id: &QuizId, progress: &QuizProgress) -> Result<(), StorageError> {
        let ser = |e: serde_json::Error| StorageError::Serialization(e.to_string());
        let mut all = self.load_raw().await?;
        all.insert(quiz_id.as_str().to_owned(), serde_json::to_value(progress).map_err(ser)?);
        let raw = serde_json::to_string(&all).map_err(ser)?;
        self.kv.set(PROGRESS_KEY, &raw).await
    }

    /// Drop every progress record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.kv.remove(PROGRESS_KEY).await
    }
}

fn decode_entry(key: &str, value: Value) -> Option<(QuizId, QuizProgress)> {
    let quiz_id = match QuizId::parse(key) {
        Ok(selection) => QuizId::from(selection),
        Err(err) => {
            debug!(key, error = %err, "skipping progress entry with invalid quiz id");
            return None;
        }
    };
    match serde_json::from_value(value) {
        Ok(progress) => Some((quiz_id, progress)),
        Err(err) => {
            debug!(key, error = %err, "skipping malformed progress entry");
            None
        }
    }
}
