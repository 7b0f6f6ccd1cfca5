mod flow;
mod results;
mod step;

pub use flow::QuizFlow;
pub use results::QuizResults;
pub use step::{Applied, FetchTicket, FlowNotice, FlowStep, NextOutcome, NoticeSource};
pub(crate) use step::FetchKind;
