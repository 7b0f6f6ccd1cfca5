use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::CategoryId;

/// Question difficulty filter accepted by the trivia API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuizIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(QuizIdError::UnknownDifficulty(s.to_owned())),
        }
    }
}

/// Question format filter accepted by the trivia API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Multiple,
    Boolean,
}

impl QuestionType {
    pub const ALL: [QuestionType; 2] = [QuestionType::Multiple, QuestionType::Boolean];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Multiple => "multiple",
            QuestionType::Boolean => "boolean",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Multiple => "Multiple Choice",
            QuestionType::Boolean => "True / False",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = QuizIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple" => Ok(QuestionType::Multiple),
            "boolean" => Ok(QuestionType::Boolean),
            _ => Err(QuizIdError::UnknownQuestionType(s.to_owned())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizIdError {
    #[error("quiz id must look like <category>-<difficulty>-<type>, got {0:?}")]
    Shape(String),
    #[error("invalid category id: {0:?}")]
    InvalidCategory(String),
    #[error("unknown difficulty: {0:?}")]
    UnknownDifficulty(String),
    #[error("unknown question type: {0:?}")]
    UnknownQuestionType(String),
}

/// The three choices that together configure one quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuizSelection {
    pub category: CategoryId,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
}

impl QuizSelection {
    #[must_use]
    pub fn new(category: CategoryId, difficulty: Difficulty, question_type: QuestionType) -> Self {
        Self {
            category,
            difficulty,
            question_type,
        }
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        QuizId::from_selection(self)
    }
}

/// Storage key for one quiz configuration, e.g. `9-easy-multiple`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(String);

impl QuizId {
    #[must_use]
    pub fn from_selection(selection: &QuizSelection) -> Self {
        Self(format!(
            "{}-{}-{}",
            selection.category, selection.difficulty, selection.question_type
        ))
    }

    /// Recover the selection encoded in a quiz identifier.
    ///
    /// # Errors
    ///
    /// Returns `QuizIdError` if the string is not `<u32>-<difficulty>-<type>`.
    pub fn parse(raw: &str) -> Result<QuizSelection, QuizIdError> {
        let mut parts = raw.split('-');
        let (Some(category), Some(difficulty), Some(question_type), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(QuizIdError::Shape(raw.to_owned()));
        };

        let category = category
            .parse::<CategoryId>()
            .map_err(|_| QuizIdError::InvalidCategory(category.to_owned()))?;
        Ok(QuizSelection::new(
            category,
            difficulty.parse()?,
            question_type.parse()?,
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<QuizSelection> for QuizId {
    fn from(selection: QuizSelection) -> Self {
        Self::from_selection(&selection)
    }
}
