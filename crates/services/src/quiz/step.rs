use std::fmt;

use quiz_core::model::QuizSelection;

use super::QuizResults;
use crate::error::TriviaError;

/// Where the user is in the quiz flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    Category,
    Difficulty,
    Type,
    Quiz,
    Results,
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStep::Category => "category",
            FlowStep::Difficulty => "difficulty",
            FlowStep::Type => "type",
            FlowStep::Quiz => "quiz",
            FlowStep::Results => "results",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSource {
    Categories,
    Questions,
}

/// A recoverable fetch failure shown to the user until the flow is reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNotice {
    source: NoticeSource,
    message: String,
}

impl FlowNotice {
    pub(crate) fn categories_unavailable() -> Self {
        Self {
            source: NoticeSource::Categories,
            message: "Failed to load categories. Please try again.".into(),
        }
    }

    pub(crate) fn questions_unavailable(err: &TriviaError) -> Self {
        Self {
            source: NoticeSource::Questions,
            message: err.user_message().into(),
        }
    }

    #[must_use]
    pub fn source(&self) -> NoticeSource {
        self.source
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchKind {
    Categories,
    Questions(QuizSelection),
}

/// Identifies one in-flight fetch so a late response can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub(crate) generation: u64,
    pub(crate) kind: FetchKind,
}

impl FetchTicket {
    /// The selection a question fetch was issued for.
    #[must_use]
    pub fn selection(&self) -> Option<&QuizSelection> {
        match &self.kind {
            FetchKind::Categories => None,
            FetchKind::Questions(selection) => Some(selection),
        }
    }
}

/// Whether a fetch result changed the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    Stale,
}

/// What `QuizFlow::next` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    Advanced { index: usize },
    Completed(QuizResults),
}
