use std::env;

use async_trait::async_trait;
use quiz_core::model::{Category, Question, QuizSelection};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, info};

use super::QUESTION_AMOUNT;
use super::wire::{decode_categories, decode_questions};
use crate::error::TriviaError;

const DEFAULT_BASE_URL: &str = "https://opentdb.com";

#[derive(Clone, Debug)]
pub struct TriviaConfig {
    pub base_url: String,
}

impl TriviaConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Reads `QUIZ_TRIVIA_BASE_URL`, falling back to the public Open Trivia DB.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("QUIZ_TRIVIA_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Self { base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

impl Default for TriviaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Where categories and questions come from.
#[async_trait]
pub trait TriviaSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `TriviaError` on transport failure or an undecodable body.
    async fn fetch_categories(&self) -> Result<Vec<Category>, TriviaError>;

    /// Fetch [`QUESTION_AMOUNT`] questions matching `selection`, in API order.
    ///
    /// # Errors
    ///
    /// Returns `TriviaError` on transport failure, a non-success response
    /// code, or an undecodable body.
    async fn fetch_questions(&self, selection: &QuizSelection)
    -> Result<Vec<Question>, TriviaError>;
}

/// HTTP client for the Open Trivia DB API.
#[derive(Clone)]
pub struct OpenTdbClient {
    client: Client,
    config: TriviaConfig,
}

impl OpenTdbClient {
    #[must_use]
    pub fn new(config: TriviaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn category_request(&self) -> RequestBuilder {
        self.client.get(self.config.endpoint("api_category.php"))
    }

    /// `api.php` filtered by the selection, always asking for
    /// [`QUESTION_AMOUNT`] questions.
    fn question_request(&self, selection: &QuizSelection) -> RequestBuilder {
        self.client.get(self.config.endpoint("api.php")).query(&[
            ("amount", QUESTION_AMOUNT.to_string()),
            ("category", selection.category.to_string()),
            ("difficulty", selection.difficulty.as_str().to_owned()),
            ("type", selection.question_type.as_str().to_owned()),
        ])
    }

    async fn send_text(&self, request: RequestBuilder) -> Result<String, TriviaError> {
        let response = request.send().await?;
        debug!(url = %response.url(), status = %response.status(), "trivia response");

        if !response.status().is_success() {
            return Err(TriviaError::HttpStatus(response.status()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl TriviaSource for OpenTdbClient {
    async fn fetch_categories(&self) -> Result<Vec<Category>, TriviaError> {
        let body = self.send_text(self.category_request()).await?;
        let categories = decode_categories(&body)?;
        info!(count = categories.len(), "loaded trivia categories");
        Ok(categories)
    }

    async fn fetch_questions(
        &self,
        selection: &QuizSelection,
    ) -> Result<Vec<Question>, TriviaError> {
        let body = self.send_text(self.question_request(selection)).await?;
        let questions = decode_questions(&body)?;
        info!(quiz_id = %selection.quiz_id(), count = questions.len(), "loaded questions");
        Ok(questions)
    }
}
