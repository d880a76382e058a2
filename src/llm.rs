//! Text-completion collaborators used for question generation.
//!
//! The engine only needs `complete(prompt) -> text`. `AnthropicModel` talks to the
//! Anthropic Messages API over a blocking HTTP client; `OfflineModel` and
//! `FixedResponseModel` cover fallback-only runs and replays of captured output.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PagegenError, Result};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_BACKOFF_SHIFT: u32 = 5;
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

const SYSTEM_PROMPT: &str = "You write concise, customer-facing FAQ questions for e-commerce product pages. You follow output format instructions exactly and never add commentary.";

/// A prompt-in, text-out completion service
pub trait LanguageModel: Send + Sync {
    /// Identifier recorded in generated pages.
    fn name(&self) -> &str;

    fn complete(&self, prompt: &str) -> Result<String>;
}

impl<T: LanguageModel + ?Sized> LanguageModel for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }
}

impl<T: LanguageModel + ?Sized> LanguageModel for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }
}

// ─── Anthropic request/response types ───────────────────────────

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiError {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Settings for `AnthropicModel`
#[derive(Debug, Clone)]
pub struct AnthropicSettings {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub max_retries: u32,
}

/// Anthropic Messages API client
pub struct AnthropicModel {
    client: reqwest::blocking::Client,
    settings: AnthropicSettings,
    endpoint: String,
}

impl AnthropicModel {
    pub fn new(settings: AnthropicSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(PagegenError::Config {
                message: "ANTHROPIC_API_KEY is not set".to_string(),
            });
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            client,
            settings,
            endpoint: ANTHROPIC_API_URL.to_string(),
        })
    }

    /// Point the client at a different Messages-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl LanguageModel for AnthropicModel {
    fn name(&self) -> &str {
        &self.settings.model
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let request = ApiRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let mut retries = 0;
        loop {
            let resp = self
                .client
                .post(&self.endpoint)
                .header("x-api-key", &self.settings.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request)
                .send()?;

            let status = resp.status();

            if status.is_success() {
                let api_resp: ApiResponse = resp.json()?;
                let text = api_resp
                    .content
                    .into_iter()
                    .map(|b| b.text)
                    .collect::<Vec<_>>()
                    .join("");
                return Ok(text.trim().to_string());
            }

            // Retry on 429 (rate limit) or 5xx (server error)
            let should_retry = status.as_u16() == 429 || status.is_server_error();

            if should_retry && retries < self.settings.max_retries {
                retries += 1;
                let wait = retry_delay(retries);
                tracing::warn!(
                    "Anthropic API {} (attempt {}/{}), retrying in {}s",
                    status,
                    retries,
                    self.settings.max_retries,
                    wait.as_secs()
                );
                std::thread::sleep(wait);
                continue;
            }

            let body = resp.text().unwrap_or_default();
            let msg = serde_json::from_str::<ApiError>(&body)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(PagegenError::Model {
                message: format!("Anthropic API error: {}", msg),
            });
        }
    }
}

/// Always answers with an empty response, forcing fallback-only output
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineModel;

impl LanguageModel for OfflineModel {
    fn name(&self) -> &str {
        "offline"
    }

    fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(String::new())
    }
}

/// Replays a fixed response regardless of the prompt
#[derive(Debug, Clone)]
pub struct FixedResponseModel {
    label: String,
    response: String,
}

impl FixedResponseModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            label: "fixed".to_string(),
            response: response.into(),
        }
    }

    /// Load a captured response from disk.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let response = std::fs::read_to_string(path).map_err(|e| PagegenError::Io {
            message: format!("failed to read replay file {:?}: {}", path, e),
        })?;
        Ok(Self {
            label: format!("replay:{}", path.display()),
            response,
        })
    }
}

impl LanguageModel for FixedResponseModel {
    fn name(&self) -> &str {
        &self.label
    }

    fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.response.clone())
    }
}

/// Exponential backoff for the given attempt: 2s, 4s, 8s, capped at 32s.
fn retry_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt.min(MAX_BACKOFF_SHIFT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn settings(api_key: &str) -> AnthropicSettings {
        AnthropicSettings {
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: 0.3,
            timeout: Duration::from_secs(5),
            max_retries: 0,
        }
    }

    #[test]
    fn test_anthropic_requires_key() {
        let err = AnthropicModel::new(settings("  ")).err().unwrap();
        assert!(matches!(err, PagegenError::Config { .. }));
        let model = AnthropicModel::new(settings("sk-test")).unwrap();
        assert_eq!(model.name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_unreachable_endpoint_is_model_error() {
        let model = AnthropicModel::new(settings("sk-test"))
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/v1/messages");
        let err = model.complete("hello").unwrap_err();
        assert!(matches!(err, PagegenError::Model { .. }));
    }

    #[test]
    fn test_retry_delay_is_capped() {
        assert_eq!(retry_delay(1), Duration::from_secs(2));
        assert_eq!(retry_delay(3), Duration::from_secs(8));
        assert_eq!(retry_delay(5), Duration::from_secs(32));
        assert_eq!(retry_delay(64), Duration::from_secs(32));
        assert_eq!(retry_delay(u32::MAX), Duration::from_secs(32));
    }

    #[test]
    fn test_request_serialization() {
        let request = ApiRequest {
            model: "m",
            max_tokens: 10,
            temperature: 0.0,
            system: "s",
            messages: vec![Message {
                role: "user",
                content: "p",
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["max_tokens"], 10);
    }

    #[test]
    fn test_offline_and_fixed_models() {
        assert_eq!(OfflineModel.complete("anything").unwrap(), "");
        let fixed = FixedResponseModel::new("[]");
        assert_eq!(fixed.complete("a").unwrap(), "[]");
        assert_eq!(fixed.name(), "fixed");

        let boxed: Box<dyn LanguageModel> = Box::new(fixed);
        assert_eq!(boxed.complete("b").unwrap(), "[]");
    }

    #[test]
    fn test_fixed_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("response.txt");
        std::fs::write(&path, "1. Is it safe?").unwrap();
        let model = FixedResponseModel::from_file(&path).unwrap();
        assert_eq!(model.complete("x").unwrap(), "1. Is it safe?");
        assert!(model.name().starts_with("replay:"));

        assert!(FixedResponseModel::from_file(&dir.path().join("nope.txt")).is_err());
    }
}
