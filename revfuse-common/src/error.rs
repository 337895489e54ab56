//! Common error types for revfuse

use thiserror::Error;

/// Common result type for revfuse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the revfuse crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML document could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}
