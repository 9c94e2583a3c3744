//! Errors raised while building or decoding a block header.

use thiserror::Error;

/// Block header construction and decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The input is not any of the recognized header shapes.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Fewer bytes remain than the header layout requires.
    #[error("Truncated input: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },
    /// A hash field is not exactly 32 bytes long.
    #[error("Malformed field {field}: expected 32 bytes, got {len}")]
    MalformedField { field: &'static str, len: usize },
}

impl HeaderError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        HeaderError::InvalidArgument(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, HeaderError>;
