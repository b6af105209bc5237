//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::settings::Settings;

use super::CompletionBackend;

/// Environment variables checked for the API key, in precedence order.
const API_KEY_ENV_VARS: [&str; 2] = ["EPIGRAF_API_KEY", "OPENAI_API_KEY"];

/// Maximum length for error content in error messages.
const MAX_ERROR_CONTENT_LEN: usize = 200;

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiBackend {
    client: Client,
    chat_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    n: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    /// Content can be null in some API responses (e.g. on refusal).
    #[serde(default)]
    content: Option<String>,
}

/// Error body shape shared by OpenAI-compatible APIs.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiBackend {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            chat_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Build a backend from settings, taking the API key from the
    /// environment.
    pub fn from_settings(settings: &Settings) -> Result<Self, BackendError> {
        let api_key = api_key_from_env().ok_or(BackendError::MissingApiKey)?;
        Self::new(
            &settings.api_base_url,
            &settings.model,
            &api_key,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|key| !key.trim().is_empty()))
}

fn truncate_message(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut end = max_len;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str, candidates: u32) -> Result<String, BackendError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            n: candidates,
        };

        let response = self
            .client
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Prefer the structured error message; fall back to the raw body.
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: truncate_message(&message, MAX_ERROR_CONTENT_LEN),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        match parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
        {
            Some(content) if !content.is_empty() => Ok(content),
            _ => Err(BackendError::NoCandidates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_prefers_epigraf_var() {
        temp_env::with_vars(
            [
                ("EPIGRAF_API_KEY", Some("epi-key")),
                ("OPENAI_API_KEY", Some("oai-key")),
            ],
            || {
                assert_eq!(api_key_from_env().as_deref(), Some("epi-key"));
            },
        );
    }

    #[test]
    fn test_api_key_falls_back_to_openai_var() {
        temp_env::with_vars(
            [
                ("EPIGRAF_API_KEY", None::<&str>),
                ("OPENAI_API_KEY", Some("oai-key")),
            ],
            || {
                assert_eq!(api_key_from_env().as_deref(), Some("oai-key"));
            },
        );
    }

    #[test]
    fn test_api_key_blank_value_is_ignored() {
        temp_env::with_vars(
            [
                ("EPIGRAF_API_KEY", Some("  ")),
                ("OPENAI_API_KEY", None::<&str>),
            ],
            || {
                assert!(api_key_from_env().is_none());
            },
        );
    }

    #[test]
    fn test_from_settings_without_key_is_missing_api_key() {
        temp_env::with_vars(
            [
                ("EPIGRAF_API_KEY", None::<&str>),
                ("OPENAI_API_KEY", None::<&str>),
            ],
            || {
                let result = OpenAiBackend::from_settings(&Settings::default());
                assert!(matches!(result, Err(BackendError::MissingApiKey)));
            },
        );
    }

    #[test]
    fn test_chat_url_normalizes_trailing_slash() {
        let backend = OpenAiBackend::new(
            "https://api.example.com/v1/",
            "test-model",
            "key",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            backend.chat_url,
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_truncate_message_respects_char_boundaries() {
        let text = "é".repeat(300);
        let truncated = truncate_message(&text, MAX_ERROR_CONTENT_LEN);
        assert!(truncated.len() <= MAX_ERROR_CONTENT_LEN);
        assert!(truncated.chars().all(|c| c == 'é'));
    }
}
