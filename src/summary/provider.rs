use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A completion backend that turns a prompt into summary text.
///
/// Failures are reported as `Error::Api` so that one bad response never
/// takes down the whole digest run.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Chat-completions client speaking the OpenAI wire format.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    timeout_duration: Duration,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(format!("rss-digest/{}", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout_duration: Duration::from_secs(30),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_duration = timeout;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl SummaryProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        // The request-level timeout runs until the body completes; the
        // outer wrap below only covers the time to response headers.
        let send = self
            .client
            .post(&self.api_url)
            .timeout(self.timeout_duration)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send();

        let response = timeout(self.timeout_duration, send)
            .await
            .map_err(|_| Error::Api(format!("Request to {} timed out", self.api_url)))?
            .map_err(|e| Error::Api(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "HTTP {} from {}: {}",
                response.status().as_u16(),
                self.api_url,
                response.status().canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Api(format!("Failed to decode completion response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Api("Completion response contained no choices".to_string()))?;

        debug!("Received {} bytes of summary text", content.len());

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
