pub mod audit;
pub mod chat;
pub mod prompt;
pub mod providers;

pub use audit::{AuditLog, AuditRecord, AUDIT_CHANNEL_CAPACITY};
pub use chat::ChatService;
pub use providers::groq::{GroqConfig, GroqProvider};
pub use providers::mock::MockCompletionProvider;
pub use providers::{
    ChatMessage, Completion, CompletionProvider, CompletionRequest, ProviderError,
};
