//! Error types for cipherpath

use thiserror::Error;

/// Errors raised by the individual resolution steps
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Codec failure: {0}")]
    Codec(String),

    #[error("Malformed stream name: {0}")]
    MalformedStream(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Directory scan failed: {0}")]
    Scan(String),

    #[error("Stream enumeration failed: {0}")]
    StreamEnumeration(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Sentinel returned to the driver layer when a path cannot be translated.
///
/// Carries no cause; the cause is only logged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("path translation failed")]
pub struct TranslationFailure;
