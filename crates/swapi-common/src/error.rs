//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, SwapiError>;

/// Errors raised while setting up a run
#[derive(Error, Debug)]
pub enum SwapiError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {name}: '{value}' ({reason})")]
    InvalidVar {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SwapiError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
