pub mod chat;
pub mod health;

pub use chat::{ChatRequest, ChatResponse, EMPTY_MESSAGE, INVALID_FORMAT};
pub use health::HealthResponse;
