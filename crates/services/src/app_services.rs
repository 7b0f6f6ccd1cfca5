use std::sync::Arc;

use storage::repository::Storage;
use storage::{ProgressStore, SessionStore};

use crate::error::AppServicesError;
use crate::quiz::QuizFlow;
use crate::tracking::TrackingService;
use crate::trivia::{OpenTdbClient, TriviaConfig, TriviaSource};
use crate::Clock;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct QuizServices {
    clock: Clock,
    trivia: Arc<dyn TriviaSource>,
    progress: ProgressStore,
    sessions: SessionStore,
    tracking: Arc<TrackingService>,
}

impl QuizServices {
    #[must_use]
    pub fn new(clock: Clock, storage: &Storage, trivia: Arc<dyn TriviaSource>) -> Self {
        let progress = ProgressStore::new(Arc::clone(&storage.kv));
        let sessions = SessionStore::new(Arc::clone(&storage.kv));
        let tracking = Arc::new(TrackingService::new(progress.clone(), sessions.clone()));
        Self {
            clock,
            trivia,
            progress,
            sessions,
            tracking,
        }
    }

    /// Build services backed by `SQLite` storage and the HTTP trivia client.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        trivia: TriviaConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(clock, &storage, Arc::new(OpenTdbClient::new(trivia))))
    }

    /// A fresh flow at the category step.
    #[must_use]
    pub fn flow(&self) -> QuizFlow {
        QuizFlow::new(
            self.clock,
            Arc::clone(&self.trivia),
            self.progress.clone(),
            self.sessions.clone(),
        )
    }

    #[must_use]
    pub fn tracking(&self) -> Arc<TrackingService> {
        Arc::clone(&self.tracking)
    }
}
