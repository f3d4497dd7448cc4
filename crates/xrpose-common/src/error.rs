//! Common error types for xrpose.

use thiserror::Error;
use xrpose_math::MathError;

/// Result type alias using xrpose's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for xrpose operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (config or frame file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Math precondition violated
    #[error("math error: {0}")]
    Math(#[from] MathError),
}

impl Error {
    /// Create a serialization error from any displayable type.
    pub fn serialization(msg: impl std::fmt::Display) -> Self {
        Self::Serialization(msg.to_string())
    }

    /// Create a config error from any displayable type.
    pub fn config(msg: impl std::fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err)
    }
}
