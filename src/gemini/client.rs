//! HTTP client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::Config;
use crate::error::GenerateError;

use super::response::{GenerateRequest, GenerateResponse};

/// Header carrying the API credential.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Maximum characters of an error body kept in [`GenerateError::Status`].
const MAX_ERROR_BODY: usize = 500;

/// Result of one attempt against one model.
#[derive(Debug)]
pub enum ModelOutcome {
    /// The model produced non-empty text.
    Text(String),
    /// This model gave nothing usable; try the next one.
    Skip(GenerateError),
    /// Stop trying any further model.
    Halt(GenerateError),
}

/// A text-generation backend addressed by model identifier.
///
/// This abstraction allows replacing the HTTP client in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Send `prompt` to `model` once and classify the result.
    async fn attempt(&self, model: &str, prompt: &str) -> ModelOutcome;
}

/// [`ModelBackend`] that talks to the Gemini REST API.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    api_base: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Build a client from the run configuration.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(&config.api_key, &config.api_base, config.timeout)
    }

    pub fn new(api_key: &str, api_base: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// URL of the `generateContent` method for `model`.
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }
}

#[async_trait]
impl ModelBackend for GeminiClient {
    async fn attempt(&self, model: &str, prompt: &str) -> ModelOutcome {
        let url = self.endpoint(model);
        debug!("POST {} ({} prompt chars)", url, prompt.len());

        let response = match self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateRequest::new(prompt))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return ModelOutcome::Skip(GenerateError::Timeout(self.timeout.as_secs()));
            }
            Err(e) => return ModelOutcome::Skip(GenerateError::Transport(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return classify_failure(status, &body);
        }

        match response.json::<GenerateResponse>().await {
            Ok(body) => {
                let text = body.first_text();
                if text.is_empty() {
                    ModelOutcome::Skip(GenerateError::EmptyResponse)
                } else {
                    ModelOutcome::Text(text)
                }
            }
            Err(e) if e.is_timeout() => {
                ModelOutcome::Skip(GenerateError::Timeout(self.timeout.as_secs()))
            }
            Err(e) => ModelOutcome::Skip(GenerateError::InvalidResponse(e.to_string())),
        }
    }
}

/// Map a non-success status to the outcome of the attempt.
pub fn classify_failure(status: StatusCode, body: &str) -> ModelOutcome {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
            ModelOutcome::Skip(GenerateError::Unavailable {
                status: status.as_u16(),
            })
        }
        StatusCode::TOO_MANY_REQUESTS => ModelOutcome::Halt(GenerateError::QuotaExhausted),
        _ => ModelOutcome::Skip(GenerateError::Status {
            status: status.as_u16(),
            body: body.trim().chars().take(MAX_ERROR_BODY).collect(),
        }),
    }
}
