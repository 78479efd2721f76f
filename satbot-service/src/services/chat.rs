//! Chat completion pipeline.
//!
//! credential check -> prompt composition -> upstream call -> result assembly.
//! Payload decoding and validation happen in the handler before this runs.
//! Every step returns early on failure and nothing is retried.

use crate::context::StaticContext;
use crate::dtos::ChatResponse;
use crate::services::audit::{AuditLog, AuditRecord};
use crate::services::prompt;
use crate::services::providers::{CompletionProvider, CompletionRequest, ProviderError};
use secrecy::Secret;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;

pub const MODEL: &str = "llama-3.1-8b-instant";
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 500;

/// Caller-facing message when the upstream could not be reached in time.
pub const UPSTREAM_UNAVAILABLE_MESSAGE: &str = "Failed to reach the chat model service";

/// Caller-facing message for every other upstream failure: error statuses,
/// unreadable or oversized bodies and empty choice lists alike.
pub const UPSTREAM_FAILURE_MESSAGE: &str =
    "The chat model service is unavailable or at its usage limit, please try again later";

#[derive(Clone)]
pub struct ChatService {
    provider: Arc<dyn CompletionProvider>,
    context: StaticContext,
    api_key: Option<Arc<Secret<String>>>,
    audit: AuditLog,
}

impl ChatService {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        context: StaticContext,
        api_key: Option<Secret<String>>,
        audit: AuditLog,
    ) -> Self {
        Self {
            provider,
            context,
            api_key: api_key.map(Arc::new),
            audit,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Answer an already validated message.
    pub async fn answer(&self, message: &str) -> Result<ChatResponse, AppError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            tracing::error!("GROQ_API_KEY is not configured, rejecting chat request");
            AppError::NotConfigured("GROQ_API_KEY is not set".to_string())
        })?;

        let request = CompletionRequest {
            messages: prompt::compose(&self.context, message),
            model: MODEL.to_string(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let completion = self
            .provider
            .complete(api_key, &request)
            .await
            .map_err(into_app_error)?;

        self.audit.record(AuditRecord {
            question: message.to_string(),
            response_time: completion.elapsed,
        });

        Ok(ChatResponse {
            response: completion.content,
            response_time: format_response_time(completion.elapsed),
        })
    }
}

/// `1.23456s` renders as `"1.2346 seconds"`.
pub fn format_response_time(elapsed: Duration) -> String {
    format!("{:.4} seconds", elapsed.as_secs_f64())
}

/// Log the full upstream detail, then collapse it into a generic caller error.
fn into_app_error(err: ProviderError) -> AppError {
    match err {
        ProviderError::Serialization(e) => {
            tracing::error!(error = %e, "Failed to prepare upstream request");
            AppError::InternalError(anyhow::anyhow!("Failed to prepare request: {}", e))
        }
        ProviderError::Network(_) | ProviderError::Timeout(_) => {
            tracing::error!(error = %err, "Failed to call Groq API");
            AppError::UpstreamUnavailable(UPSTREAM_UNAVAILABLE_MESSAGE.to_string())
        }
        ProviderError::Status { status, ref body } => {
            tracing::error!(status, body = %body, "Groq API returned an error");
            AppError::UpstreamFailure(UPSTREAM_FAILURE_MESSAGE.to_string())
        }
        ProviderError::BodyTooLarge { .. }
        | ProviderError::Parse(_)
        | ProviderError::EmptyChoices => {
            tracing::error!(error = %err, "Unusable response from Groq API");
            AppError::UpstreamFailure(UPSTREAM_FAILURE_MESSAGE.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::MockCompletionProvider;
    use tokio::sync::mpsc;

    fn service(
        provider: Arc<MockCompletionProvider>,
        api_key: Option<&str>,
    ) -> (ChatService, mpsc::Receiver<AuditRecord>) {
        let (tx, rx) = mpsc::channel(8);
        let service = ChatService::new(
            provider,
            StaticContext::new("Saturnalia 2025 runs Nov 7-9."),
            api_key.map(|k| Secret::new(k.to_string())),
            AuditLog::new(tx),
        );
        (service, rx)
    }

    #[test]
    fn formats_four_decimal_places() {
        assert_eq!(
            format_response_time(Duration::from_micros(1_234_567)),
            "1.2346 seconds"
        );
        assert_eq!(format_response_time(Duration::ZERO), "0.0000 seconds");
    }

    #[tokio::test]
    async fn answers_with_first_candidate_and_audits() {
        let provider = Arc::new(
            MockCompletionProvider::replying("It runs Nov 7-9!")
                .with_elapsed(Duration::from_millis(1500)),
        );
        let (service, mut audit) = service(provider.clone(), Some("gsk_test"));

        let response = service.answer("When is Saturnalia?").await.unwrap();
        assert_eq!(response.response, "It runs Nov 7-9!");
        assert_eq!(response.response_time, "1.5000 seconds");

        let request = provider.last_request().unwrap();
        assert_eq!(request.model, MODEL);
        assert_eq!(request.temperature, TEMPERATURE);
        assert_eq!(request.max_tokens, MAX_TOKENS);
        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[0]
            .content
            .contains("Saturnalia 2025 runs Nov 7-9."));
        assert_eq!(
            request.messages[1].content,
            "User Query: When is Saturnalia?\n\nAnswer:"
        );

        let record = audit.recv().await.unwrap();
        assert_eq!(record.question, "When is Saturnalia?");
        assert_eq!(record.response_time, Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn missing_key_skips_upstream() {
        let provider = Arc::new(MockCompletionProvider::replying("unused"));
        let (service, _audit) = service(provider.clone(), None);

        let err = service.answer("hello").await.unwrap_err();
        assert!(matches!(err, AppError::NotConfigured(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn upstream_status_is_hidden_from_caller() {
        let provider = Arc::new(MockCompletionProvider::failing(ProviderError::Status {
            status: 429,
            body: r#"{"error":{"message":"Rate limit reached for model"}}"#.to_string(),
        }));
        let (service, mut audit) = service(provider, Some("gsk_test"));

        let err = service.answer("hello").await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamFailure(_)));
        assert_eq!(err.public_message(), UPSTREAM_FAILURE_MESSAGE);
        assert!(!err.public_message().contains("Rate limit"));
        assert!(audit.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_choices_and_bad_statuses_share_one_message() {
        for failure in [
            ProviderError::EmptyChoices,
            ProviderError::Parse("expected value".to_string()),
            ProviderError::BodyTooLarge {
                status: 200,
                limit: 16,
            },
        ] {
            let provider = Arc::new(MockCompletionProvider::failing(failure));
            let (service, _audit) = service(provider, Some("gsk_test"));
            let err = service.answer("hello").await.unwrap_err();
            assert_eq!(err.public_message(), UPSTREAM_FAILURE_MESSAGE);
        }
    }

    #[tokio::test]
    async fn transport_failures_report_unavailable() {
        let provider = Arc::new(MockCompletionProvider::failing(ProviderError::Timeout(
            Duration::from_secs(30),
        )));
        let (service, _audit) = service(provider, Some("gsk_test"));

        let err = service.answer("hello").await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
        assert_eq!(err.public_message(), UPSTREAM_UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn serialization_failure_is_internal() {
        let provider = Arc::new(MockCompletionProvider::failing(
            ProviderError::Serialization("float is NaN".to_string()),
        ));
        let (service, _audit) = service(provider, Some("gsk_test"));

        let err = service.answer("hello").await.unwrap_err();
        assert!(matches!(err, AppError::InternalError(_)));
    }
}
