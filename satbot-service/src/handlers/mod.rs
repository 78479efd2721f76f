//! HTTP handlers for the satbot service.

pub mod chat;
pub mod health;

pub use chat::chat_completion;
pub use health::health_check;

use axum::BoxError;
use service_core::error::AppError;
use tower::timeout::error::Elapsed;

/// Fallback for a known route hit with an unsupported method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Render errors raised by the middleware stack, chiefly the request envelope
/// timing out.
pub async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request exceeded the server-side time limit");
        AppError::RequestTimeout
    } else {
        AppError::InternalError(anyhow::anyhow!("Unhandled middleware error: {}", err))
    }
}
