use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Difficulty, QuestionType};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyQuestion,
    #[error("correct answer is empty")]
    EmptyCorrectAnswer,
    #[error("question has no incorrect answers")]
    NoIncorrectAnswers,
}

/// A single trivia question with display-ready (entity-decoded) text.
///
/// The answer order exposed here is always "correct first"; the shuffled
/// display order lives in [`crate::shuffle::ShuffleTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    difficulty: Option<Difficulty>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    question_type: Option<QuestionType>,
}

impl Question {
    /// Build a question from already-decoded text.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the question or correct answer is blank, or
    /// if there are no incorrect answers to choose from.
    pub fn new(
        question: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
    ) -> Result<Self, QuestionError> {
        let question = question.into();
        let correct_answer = correct_answer.into();
        if question.trim().is_empty() {
            return Err(QuestionError::EmptyQuestion);
        }
        if correct_answer.trim().is_empty() {
            return Err(QuestionError::EmptyCorrectAnswer);
        }
        if incorrect_answers.is_empty() {
            return Err(QuestionError::NoIncorrectAnswers);
        }
        Ok(Self {
            question,
            correct_answer,
            incorrect_answers,
            category: None,
            difficulty: None,
            question_type: None,
        })
    }

    /// Attach the metadata the API reports alongside each question.
    #[must_use]
    pub fn with_metadata(
        mut self,
        category: Option<String>,
        difficulty: Option<Difficulty>,
        question_type: Option<QuestionType>,
    ) -> Self {
        self.category = category;
        self.difficulty = difficulty;
        self.question_type = question_type;
        self
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    #[must_use]
    pub fn question_type(&self) -> Option<QuestionType> {
        self.question_type
    }

    /// Correct answer followed by the incorrect ones, unshuffled.
    #[must_use]
    pub fn all_answers(&self) -> Vec<String> {
        let mut answers = Vec::with_capacity(self.incorrect_answers.len() + 1);
        answers.push(self.correct_answer.clone());
        answers.extend(self.incorrect_answers.iter().cloned());
        answers
    }

    /// Exact string comparison against the correct answer.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}
