//! Error types shared by every DHO crate

use thiserror::Error;
use std::result;

/// Common result type used throughout the DHO crates
pub type Result<T> = result::Result<T, Error>;

/// Common error type for value parsing, configuration and logging
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed asset string or incompatible asset arithmetic
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    /// Malformed account name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Malformed checksum
    #[error("Invalid checksum: {0}")]
    InvalidChecksum(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    Logging(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new asset error
    pub fn asset<S: Into<String>>(msg: S) -> Self {
        Error::InvalidAsset(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }
}
