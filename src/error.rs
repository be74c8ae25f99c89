//! Error types for MargaNav

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// MargaNav error type
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Device communication or bring-up failure
    #[error("Device error: {0}")]
    Device(String),

    /// Requested device or operation is not supported
    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
