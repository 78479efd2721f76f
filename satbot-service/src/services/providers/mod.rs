//! Upstream completion provider abstraction.
//!
//! The chat pipeline talks to a [`CompletionProvider`]; the production backend is
//! [`groq::GroqProvider`], tests substitute [`mock::MockCompletionProvider`].

pub mod groq;
pub mod mock;

use async_trait::async_trait;
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Error type for provider operations.
///
/// Variants carry the full upstream detail for operational logs. None of it is
/// meant for callers.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Failed to serialize request: {0}")]
    Serialization(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream response (status {status}) exceeded {limit} bytes")]
    BodyTooLarge { status: u16, limit: usize },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Upstream returned no choices")]
    EmptyChoices,
}

/// One turn of the upstream conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of an OpenAI-compatible chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// First candidate of a successful call, with the time spent on the wire.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    /// From just before the request is sent until the body is fully read.
    pub elapsed: Duration,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Perform exactly one upstream call. Implementations never retry.
    async fn complete(
        &self,
        api_key: &Secret<String>,
        request: &CompletionRequest,
    ) -> Result<Completion, ProviderError>;
}
