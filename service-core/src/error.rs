use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Message returned when a required credential or setting is absent at call time.
pub const NOT_CONFIGURED_MESSAGE: &str = "Chat service is not configured";

#[derive(Debug, Error)]
pub enum AppError {
    /// Client-side mistake. The message is returned to the caller verbatim.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Not found")]
    NotFound,

    /// The request did not complete within the server-side envelope.
    #[error("Request timed out")]
    RequestTimeout,

    /// A setting needed to serve the request is missing.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// The upstream service could not be reached or timed out.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream service answered, but not with something usable.
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// Wire shape of every error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::NotConfigured(_)
            | AppError::UpstreamUnavailable(_)
            | AppError::UpstreamFailure(_)
            | AppError::InternalError(_)
            | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The text shown to the caller. Internal detail never leaves the process.
    pub fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::NotFound => "Not found".to_string(),
            AppError::RequestTimeout => "Request timed out".to_string(),
            AppError::NotConfigured(_) => NOT_CONFIGURED_MESSAGE.to_string(),
            AppError::UpstreamUnavailable(msg) | AppError::UpstreamFailure(msg) => msg.clone(),
            AppError::InternalError(_) => "Internal server error".to_string(),
            AppError::ConfigError(_) => "Configuration error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::debug!(error = %self, status = %status, "Request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let err = AppError::BadRequest("Message cannot be empty".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Message cannot be empty");
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = AppError::InternalError(anyhow::anyhow!("serializer exploded at byte 12"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::NotConfigured("GROQ_API_KEY is not set".to_string());
        assert_eq!(err.public_message(), NOT_CONFIGURED_MESSAGE);
    }

    #[test]
    fn upstream_errors_map_to_500() {
        let err = AppError::UpstreamFailure("generic".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = AppError::UpstreamUnavailable("generic".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn timeout_renders_json_408() {
        let response = AppError::RequestTimeout.into_response();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Request timed out" }));
    }

    #[tokio::test]
    async fn renders_error_json_body() {
        let response = AppError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Method not allowed" }));
    }
}
