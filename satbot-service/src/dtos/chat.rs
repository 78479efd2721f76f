use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const INVALID_FORMAT: &str = "Invalid request format";
pub const EMPTY_MESSAGE: &str = "Message cannot be empty";

/// Inbound chat payload. Unknown fields are rejected rather than ignored.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ChatRequest {
    /// A missing field decodes as empty and is then rejected by validation.
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Message cannot be empty"))]
    pub message: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
    pub response_time: String,
}
