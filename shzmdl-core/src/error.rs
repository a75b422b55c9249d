//! Error types for shzmdl

use thiserror::Error;

/// Main error type for shzmdl operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error on line {line}: {message}")]
    Decode { line: usize, message: String },

    #[error("{kind} index {index} out of range (len = {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for a decode failure on a 1-based source line
    pub fn decode<S: Into<String>>(line: usize, message: S) -> Self {
        Error::Decode {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for shzmdl operations
pub type Result<T> = std::result::Result<T, Error>;
