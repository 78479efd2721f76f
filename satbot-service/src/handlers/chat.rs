use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{ChatRequest, ChatResponse, EMPTY_MESSAGE, INVALID_FORMAT};
use crate::startup::AppState;

/// `POST /chat`. Other methods never reach this handler; the route's method
/// fallback answers them with 405.
///
/// The body is decoded by hand so that every decode failure, including a
/// missing or wrong content type or a body over the size limit, maps to the
/// same 400 response.
#[tracing::instrument(skip(state, body), fields(body_len = tracing::field::Empty))]
pub async fn chat_completion(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let body = body.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read chat payload");
        AppError::BadRequest(INVALID_FORMAT.to_string())
    })?;
    tracing::Span::current().record("body_len", body.len());

    let request: ChatRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed chat payload");
        AppError::BadRequest(INVALID_FORMAT.to_string())
    })?;

    request.validate().map_err(|_| {
        tracing::debug!("Rejected empty chat message");
        AppError::BadRequest(EMPTY_MESSAGE.to_string())
    })?;

    let response = state.chat.answer(&request.message).await?;

    Ok(Json(response))
}
