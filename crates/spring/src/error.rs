use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpringError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Unsupported source id: {0}")]
    UnsupportedSource(String),
}

pub type Result<T> = std::result::Result<T, SpringError>;
