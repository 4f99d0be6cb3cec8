use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyscopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Failed to parse {source_id}: {message}")]
    ParseFailure { source_id: String, message: String },
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for KeyscopeError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        KeyscopeError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KeyscopeError>;
