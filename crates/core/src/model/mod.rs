mod answers;
mod category;
mod progress;
mod question;
mod selection;
mod session;

pub use answers::AnswerMap;
pub use category::{Category, CategoryId};
pub use progress::{AnswerSnapshot, ProgressStatus, QuizProgress};
pub use question::{Question, QuestionError};
pub use selection::{Difficulty, QuestionType, QuizId, QuizIdError, QuizSelection};
pub use session::QuizSession;
