//! Error types for Project Lunar.

use thiserror::Error;

/// Top-level error type for Lunar operations.
#[derive(Debug, Error)]
pub enum LunarError {
    /// Configuration is missing a required value or holds an invalid one
    #[error("Configuration error: {0}")]
    Config(String),

    /// RON parse errors
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// TOML parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Lunar operations.
pub type LunarResult<T> = Result<T, LunarError>;
