use keyscope_core::KeyscopeError;
use keyscope_spring::SpringError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid workspace descriptor {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
    #[error("Unknown module: {0}")]
    UnknownModule(String),
    #[error(transparent)]
    Spring(#[from] SpringError),
    #[error(transparent)]
    Core(#[from] KeyscopeError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
