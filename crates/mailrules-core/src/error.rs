//! Error types for the core library.

use thiserror::Error;

use crate::provider::ProviderError;

/// Errors that abort a run.
///
/// Failures of individual actions are not represented here; the engine
/// logs and counts them instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rule file is not valid JSON or does not have the expected shape.
    #[error("Invalid rule file: {0}")]
    Rules(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Mail provider call failed outside the per-email action boundary.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Credential loading or refresh failed.
    #[error("Authentication error: {0}")]
    Auth(#[from] mailrules_oauth::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
