mod client;
mod wire;

pub use client::{OpenTdbClient, TriviaConfig, TriviaSource};
pub use wire::{ResponseCode, decode_categories, decode_questions};

/// Number of questions requested per quiz.
pub const QUESTION_AMOUNT: u32 = 10;
