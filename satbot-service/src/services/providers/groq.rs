//! Groq chat completions backend.
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol. One shared HTTP
//! client carries the call timeout; response bodies are read under a hard cap.

use super::{Completion, CompletionProvider, CompletionRequest, ProviderError};
use crate::config::DEFAULT_GROQ_API_URL;
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Budget for the whole upstream call, body included.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest upstream body we are willing to buffer (10 MiB).
pub const MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub max_response_bytes: usize,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GROQ_API_URL.to_string(),
            timeout: UPSTREAM_TIMEOUT,
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }
}

pub struct GroqProvider {
    config: GroqConfig,
    client: Client,
}

impl GroqProvider {
    pub fn new(config: GroqConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GroqConfig {
        &self.config
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.config.timeout)
        } else {
            ProviderError::Network(err.to_string())
        }
    }

    /// Read the body chunk by chunk, failing once it grows past the cap.
    async fn read_capped(&self, mut response: Response) -> Result<Vec<u8>, ProviderError> {
        let status = response.status().as_u16();
        let limit = self.config.max_response_bytes;

        if response
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(ProviderError::BodyTooLarge { status, limit });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_error(e))?
        {
            if body.len() + chunk.len() > limit {
                return Err(ProviderError::BodyTooLarge { status, limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    async fn complete(
        &self,
        api_key: &Secret<String>,
        request: &CompletionRequest,
    ) -> Result<Completion, ProviderError> {
        let payload =
            serde_json::to_vec(request).map_err(|e| ProviderError::Serialization(e.to_string()))?;

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending request to Groq API"
        );

        let started = Instant::now();

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key.expose_secret())
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = self.read_capped(response).await?;
        let elapsed = started.elapsed();

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_slice(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyChoices)?;

        Ok(Completion { content, elapsed })
    }
}

// Upstream wire types. Only the fields we read are modelled.

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_upstream_contract() {
        let config = GroqConfig::default();
        assert_eq!(config.api_url, DEFAULT_GROQ_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_response_bytes, 10_485_760);
    }

    #[test]
    fn parses_first_choice_shape() {
        let parsed: CompletionResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Hi!"},"finish_reason":"stop"}],"usage":{"total_tokens":3}}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices[0].message.content, "Hi!");
    }

    #[test]
    fn missing_choices_does_not_parse() {
        assert!(serde_json::from_str::<CompletionResponse>(r#"{"error":"nope"}"#).is_err());
    }
}
