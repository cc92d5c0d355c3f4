use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ConversationError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("conversation not found: {token}")]
    NotFound { token: String },

    #[error("index {index} out of range (1-{len})")]
    OutOfRange { index: String, len: usize },

    #[error("invalid range {start}-{end}: start is after end")]
    InvalidRange { start: i64, end: i64 },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("'{token}' matches {count} conversations; expected exactly one")]
    Ambiguous { token: String, count: usize },

    #[error("conversation '{name}' already exists")]
    Collision { name: String },

    #[error("invalid conversation name '{name}'")]
    InvalidName { name: String },

    #[error("prompt failed: {source}")]
    Prompt {
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConversationError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn not_found(token: impl Into<String>) -> Self {
        Self::NotFound {
            token: token.into(),
        }
    }
}
