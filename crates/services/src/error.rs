//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::QuizIdError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::quiz::FlowStep;

/// Errors emitted by the trivia client and its response decoding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TriviaError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("trivia request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("malformed trivia response: {0}")]
    Malformed(String),
    #[error("not enough questions for the chosen filters")]
    NoResults,
    #[error("trivia api rejected a request parameter")]
    InvalidParameter,
    #[error("trivia api returned response code {0}")]
    Upstream(i64),
}

impl TriviaError {
    /// Text shown to the user when a question fetch fails this way.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            TriviaError::NoResults => "Not enough questions available. Try with different options.",
            TriviaError::InvalidParameter => "Invalid parameter in API request.",
            TriviaError::Upstream(_) => "Something went wrong. Please try again.",
            TriviaError::Http(_) | TriviaError::HttpStatus(_) => {
                "Failed to load questions. Please try again."
            }
            TriviaError::Malformed(_) => {
                "Received an unexpected response from the trivia service."
            }
        }
    }
}

/// Errors emitted by `QuizFlow`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error("expected the {expected} step, but the quiz is at {actual}")]
    WrongStep { expected: FlowStep, actual: FlowStep },
    #[error("unknown category {0}")]
    UnknownCategory(u32),
    #[error("{0:?} is not one of the choices for this question")]
    UnknownAnswer(String),
    #[error("the current question has not been answered")]
    Unanswered,
    #[error("already at the first question")]
    AtFirstQuestion,
    #[error("question index {index} is out of range for {len} questions")]
    OutOfRange { index: usize, len: usize },
    #[error("no questions loaded")]
    NoQuestions,
    #[error("selection is incomplete")]
    IncompleteSelection,
    #[error(transparent)]
    InvalidQuizId(#[from] QuizIdError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `TrackingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackingError {
    #[error(transparent)]
    InvalidQuizId(#[from] QuizIdError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
