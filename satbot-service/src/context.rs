//! Reference document injected into every prompt.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Used whenever the context document is missing or blank.
pub const NO_CONTEXT: &str = "No context available";

/// Immutable fest context shared by every request.
#[derive(Debug, Clone)]
pub struct StaticContext(Arc<str>);

impl StaticContext {
    /// Build from raw document text. Surrounding whitespace is trimmed and a
    /// blank document becomes [`NO_CONTEXT`].
    pub fn new(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Self::placeholder()
        } else {
            Self(Arc::from(text))
        }
    }

    pub fn placeholder() -> Self {
        Self(Arc::from(NO_CONTEXT))
    }

    /// Read the document once at startup. Failures degrade to the placeholder.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let context = Self::new(&contents);
                if context.is_placeholder() {
                    tracing::warn!(path = %path.display(), "Context document is empty");
                } else {
                    tracing::info!(
                        path = %path.display(),
                        bytes = context.as_str().len(),
                        "Context loaded successfully"
                    );
                }
                context
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Could not read context document"
                );
                Self::placeholder()
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_placeholder(&self) -> bool {
        &*self.0 == NO_CONTEXT
    }
}

impl fmt::Display for StaticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
