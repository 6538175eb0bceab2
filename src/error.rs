//! Error types for newsdeck

use thiserror::Error;

use crate::sources::ProviderKind;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("API error: {code} - {message}")]
    ApiError {
        code: String,
        message: String,
    },

    #[error("{provider} fetch failed: {message}")]
    ProviderError {
        provider: ProviderKind,
        message: String,
    },

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Invalid data: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl NewsError {
    /// Wraps any error as a failure of the given provider.
    pub fn provider(provider: ProviderKind, err: impl std::fmt::Display) -> Self {
        NewsError::ProviderError {
            provider,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NewsError>;
