//! LLM client: the single point of entry for model calls in cvforge.
//!
//! No other module talks to the Anthropic API directly. Text generation and
//! resume parsing both go through [`LlmClient`].

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for every call.
pub const MODEL: &str = "claude-sonnet-4-5";
/// Budget for structured (JSON) replies such as a parsed resume.
const JSON_MAX_TOKENS: u32 = 4096;
const ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned no text")]
    EmptyContent,
}

impl LlmError {
    /// Rate limits, server errors and transport failures are worth another try.
    fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Parse(_) | LlmError::EmptyContent => false,
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserTurn<'a>; 1],
}

#[derive(Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesReply {
    content: Vec<ReplyBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReplyBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

impl MessagesReply {
    /// All text blocks joined, trimmed.
    fn into_text(self) -> Result<String, LlmError> {
        let text: String = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                ReplyBlock::Text { text } => Some(text),
                ReplyBlock::Other => None,
            })
            .collect();
        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text.to_string())
    }
}

#[derive(Deserialize)]
struct ErrorReply {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Delay before retry number `retry` (1-based): 1s, 2s, 4s, ...
fn backoff(retry: u32) -> Duration {
    Duration::from_secs(1 << retry.saturating_sub(1).min(6))
}

/// Anthropic Messages API client with retries for transient failures.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, api_key })
    }

    async fn send_once(&self, request: &MessagesRequest<'_>) -> Result<String, LlmError> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return response.json::<MessagesReply>().await?.into_text();
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorReply>(&body)
            .map(|reply| reply.error.message)
            .unwrap_or(body);
        Err(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Sends one user turn and returns the reply text.
    async fn complete(&self, prompt: &str, system: &str, max_tokens: u32) -> Result<String, LlmError> {
        let request = MessagesRequest {
            model: MODEL,
            max_tokens,
            system,
            messages: [UserTurn {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 1;
        loop {
            match self.send_once(&request).await {
                Ok(text) => {
                    debug!("Model replied with {} chars on attempt {attempt}", text.len());
                    return Ok(text);
                }
                Err(e) if e.is_transient() && attempt < ATTEMPTS => {
                    let delay = backoff(attempt);
                    warn!("Model call failed ({e}), retrying in {}s", delay.as_secs());
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Calls the model and reads its reply as JSON. The prompt must ask for JSON.
    pub async fn call_json<T: DeserializeOwned>(&self, prompt: &str, system: &str) -> Result<T, LlmError> {
        let text = self.complete(prompt, system, JSON_MAX_TOKENS).await?;
        Ok(serde_json::from_str(strip_code_fence(&text))?)
    }

    /// Calls the model for free-form prose.
    pub async fn call_text(&self, prompt: &str, system: &str, max_tokens: u32) -> Result<String, LlmError> {
        self.complete(prompt, system, max_tokens).await
    }
}

/// Removes a surrounding markdown code fence (with or without a language tag).
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    let body = body.trim_start();
    body.strip_suffix("```").unwrap_or(body).trim()
}
