#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod quiz;
pub mod tracking;
pub mod trivia;

pub use quiz_core::Clock;

pub use app_services::QuizServices;
pub use error::{AppServicesError, QuizFlowError, TrackingError, TriviaError};
pub use quiz::{
    Applied, FetchTicket, FlowNotice, FlowStep, NextOutcome, NoticeSource, QuizFlow, QuizResults,
};
pub use tracking::{SessionListItem, TrackingService};
pub use trivia::{OpenTdbClient, QUESTION_AMOUNT, TriviaConfig, TriviaSource};
