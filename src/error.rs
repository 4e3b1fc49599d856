//! Error types for jpt-tools

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for jpt-tools operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scaffolding
#[derive(Error, Debug)]
pub enum Error {
    #[error("{} has already been created", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Malformed file {}: missing '{marker}'", .path.display())]
    MissingMarker { path: PathBuf, marker: String },

    #[error("Invalid test subject: {0}")]
    InvalidSubject(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Project regeneration failed: {0}")]
    Collaborator(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn missing_marker(path: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Error::MissingMarker {
            path: path.into(),
            marker: marker.into(),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<inquire::InquireError> for Error {
    fn from(err: inquire::InquireError) -> Self {
        Error::Prompt(err.to_string())
    }
}
