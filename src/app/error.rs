use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplashError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Coarse classification used when logging failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Other,
}

impl SplashError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SplashError::Http(_) | SplashError::Status { .. } | SplashError::Timeout(_) => {
                FailureKind::Transport
            }
            _ => FailureKind::Other,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == FailureKind::Transport
    }
}

pub type Result<T> = std::result::Result<T, SplashError>;
