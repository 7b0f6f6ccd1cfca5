//! Response shapes of the trivia API and their validated decoding.

use quiz_core::model::{Category, CategoryId, Difficulty, Question, QuestionType};
use quiz_core::text::decode_html;
use serde::Deserialize;

use crate::error::TriviaError;

/// `response_code` values reported by the question endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    NoResults,
    InvalidParameter,
    Other(i64),
}

impl ResponseCode {
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::NoResults,
            2 => Self::InvalidParameter,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    trivia_categories: Vec<WireCategory>,
}

#[derive(Debug, Deserialize)]
struct WireCategory {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct QuestionsResponse {
    response_code: i64,
    #[serde(default)]
    results: Vec<WireQuestion>,
}

#[derive(Debug, Deserialize)]
struct WireQuestion {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    category: Option<String>,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

fn malformed<E: core::fmt::Display>(e: E) -> TriviaError {
    TriviaError::Malformed(e.to_string())
}

/// Decode the category listing into typed categories.
///
/// # Errors
///
/// Returns `TriviaError::Malformed` if the body does not have the expected
/// shape or a category has a blank name.
pub fn decode_categories(body: &str) -> Result<Vec<Category>, TriviaError> {
    let response: CategoriesResponse = serde_json::from_str(body).map_err(malformed)?;
    response
        .trivia_categories
        .into_iter()
        .map(|c| {
            let name = decode_html(&c.name);
            if name.trim().is_empty() {
                return Err(TriviaError::Malformed(format!("category {} has no name", c.id)));
            }
            Ok(Category::new(CategoryId::new(c.id), name))
        })
        .collect()
}

/// Decode a question batch, turning non-success response codes into errors.
///
/// Text fields are HTML-entity decoded. Order is preserved.
///
/// # Errors
///
/// Returns `TriviaError::NoResults`, `InvalidParameter` or `Upstream` for the
/// matching response codes, and `Malformed` for bodies that do not decode into
/// valid questions.
pub fn decode_questions(body: &str) -> Result<Vec<Question>, TriviaError> {
    let response: QuestionsResponse = serde_json::from_str(body).map_err(malformed)?;
    match ResponseCode::from_code(response.response_code) {
        ResponseCode::Success => {}
        ResponseCode::NoResults => return Err(TriviaError::NoResults),
        ResponseCode::InvalidParameter => return Err(TriviaError::InvalidParameter),
        ResponseCode::Other(code) => return Err(TriviaError::Upstream(code)),
    }

    if response.results.is_empty() {
        return Err(TriviaError::NoResults);
    }

    response
        .results
        .into_iter()
        .enumerate()
        .map(|(idx, q)| decode_question(q).map_err(|e| malformed(format!("question {idx}: {e}"))))
        .collect()
}

fn decode_question(wire: WireQuestion) -> Result<Question, String> {
    let difficulty = wire
        .difficulty
        .as_deref()
        .map(str::parse::<Difficulty>)
        .transpose()
        .map_err(|e| e.to_string())?;
    let question_type = wire
        .kind
        .as_deref()
        .map(str::parse::<QuestionType>)
        .transpose()
        .map_err(|e| e.to_string())?;

    let incorrect = wire
        .incorrect_answers
        .iter()
        .map(|a| decode_html(a))
        .collect();
    let question = Question::new(
        decode_html(&wire.question),
        decode_html(&wire.correct_answer),
        incorrect,
    )
    .map_err(|e| e.to_string())?;

    Ok(question.with_metadata(
        wire.category.as_deref().map(decode_html),
        difficulty,
        question_type,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUESTIONS_OK: &str = r#"{
        "response_code": 0,
        "results": [
            {
                "type": "multiple",
                "difficulty": "easy",
                "category": "Entertainment: Books",
                "question": "Who wrote &quot;Dracula&quot;?",
                "correct_answer": "Bram Stoker",
                "incorrect_answers": ["Mary Shelley", "Edgar Allan Poe", "H. P. Lovecraft"]
            },
            {
                "type": "boolean",
                "difficulty": "easy",
                "category": "Science &amp; Nature",
                "question": "Water&#039;s boiling point is 100 degrees at sea level.",
                "correct_answer": "True",
                "incorrect_answers": ["False"]
            }
        ]
    }"#;

    #[test]
    fn decodes_questions_in_order_with_entities_resolved() {
        let questions = decode_questions(QUESTIONS_OK).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question(), "Who wrote \"Dracula\"?");
        assert_eq!(questions[0].correct_answer(), "Bram Stoker");
        assert_eq!(questions[0].incorrect_answers().len(), 3);
        assert_eq!(questions[0].question_type(), Some(QuestionType::Multiple));
        assert_eq!(questions[1].question(), "Water's boiling point is 100 degrees at sea level.");
        assert_eq!(questions[1].category(), Some("Science & Nature"));
    }

    #[test]
    fn response_codes_become_errors() {
        assert!(matches!(
            decode_questions(r#"{"response_code":1,"results":[]}"#),
            Err(TriviaError::NoResults)
        ));
        assert!(matches!(
            decode_questions(r#"{"response_code":2,"results":[]}"#),
            Err(TriviaError::InvalidParameter)
        ));
        assert!(matches!(
            decode_questions(r#"{"response_code":5}"#),
            Err(TriviaError::Upstream(5))
        ));
    }

    #[test]
    fn unexpected_shapes_are_malformed() {
        assert!(matches!(decode_questions("<html>"), Err(TriviaError::Malformed(_))));
        assert!(matches!(
            decode_questions(r#"{"results":[]}"#),
            Err(TriviaError::Malformed(_))
        ));
        let missing_answers = r#"{"response_code":0,"results":[
            {"question":"Q","correct_answer":"A","incorrect_answers":[]}
        ]}"#;
        assert!(matches!(
            decode_questions(missing_answers),
            Err(TriviaError::Malformed(_))
        ));
        let bad_difficulty = r#"{"response_code":0,"results":[
            {"difficulty":"brutal","question":"Q","correct_answer":"A","incorrect_answers":["B"]}
        ]}"#;
        assert!(matches!(
            decode_questions(bad_difficulty),
            Err(TriviaError::Malformed(_))
        ));
    }

    #[test]
    fn success_without_results_counts_as_no_results() {
        assert!(matches!(
            decode_questions(r#"{"response_code":0,"results":[]}"#),
            Err(TriviaError::NoResults)
        ));
    }

    #[test]
    fn decodes_categories() {
        let body = r#"{"trivia_categories":[
            {"id":9,"name":"General Knowledge"},
            {"id":10,"name":"Entertainment: Books"}
        ]}"#;
        let categories = decode_categories(body).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].id(), CategoryId::new(9));
        assert_eq!(categories[1].name(), "Entertainment: Books");

        assert!(matches!(
            decode_categories(r#"{"trivia_categories":[{"id":"x","name":"A"}]}"#),
            Err(TriviaError::Malformed(_))
        ));
        assert!(matches!(
            decode_categories(r#"{"trivia_categories":[{"id":1,"name":"  "}]}"#),
            Err(TriviaError::Malformed(_))
        ));
    }
}
