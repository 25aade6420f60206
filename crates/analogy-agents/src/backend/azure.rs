//! Azure OpenAI chat-completions backend

use super::{CompletionRequest, ReasoningBackend};
use crate::error::BackendError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Connection settings for an Azure OpenAI deployment
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,
    /// API key sent in the `api-key` header
    pub api_key: String,
    /// Deployment (model) name
    pub deployment: String,
    /// REST API version
    pub api_version: String,
    /// Sampling temperature
    pub temperature: f32,
    /// HTTP request timeout
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: "gpt-4o".to_string(),
            api_version: "2024-02-15-preview".to_string(),
            temperature: 0.2,
            timeout_secs: 120,
        }
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl BackendConfig {
    /// Check that every required field is present
    ///
    /// # Errors
    /// Returns `BackendError::Config` naming the first missing or invalid field
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.endpoint.trim().is_empty() {
            return Err(BackendError::Config("endpoint is not set".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(BackendError::Config("api key is not set".into()));
        }
        if self.deployment.trim().is_empty() {
            return Err(BackendError::Config("deployment is not set".into()));
        }
        if self.timeout_secs == 0 {
            return Err(BackendError::Config("timeout must be positive".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(BackendError::Config(format!(
                "temperature {} outside [0, 2]",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Chat-completions URL for the configured deployment
    #[must_use]
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Reasoning backend talking to an Azure OpenAI deployment
pub struct AzureOpenAiBackend {
    client: Client,
    url: String,
    api_key: String,
    temperature: f32,
}

impl fmt::Debug for AzureOpenAiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAiBackend")
            .field("url", &self.url)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl AzureOpenAiBackend {
    /// Build a backend from validated configuration
    ///
    /// # Errors
    /// Returns `BackendError::Config` for incomplete configuration or when
    /// the HTTP client cannot be built
    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.completions_url(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
        })
    }

    fn classify_send_error(err: &reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Connection(err.to_string())
        } else {
            BackendError::Connection(format!("request failed: {err}"))
        }
    }
}

#[async_trait]
impl ReasoningBackend for AzureOpenAiBackend {
    #[instrument(skip(self, request), fields(agent = %request.agent))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let body = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::classify_send_error(&e))?;

        let status = response.status();
        debug!(status = status.as_u16(), "completion response received");

        if status.is_success() {
            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| BackendError::Payload(format!("failed to parse response: {e}")))?;
            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| BackendError::Payload("response has no message content".into()))
        } else if status.as_u16() == 429 {
            Err(BackendError::RateLimited)
        } else {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map_or(text, |e| e.error.message);
            Err(BackendError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}
