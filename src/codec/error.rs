//! Error types for value encoding and decoding.

use thiserror::Error;

/// Errors that can occur while encoding or decoding value payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("Invalid payload length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("String cannot contain a NUL character (found at position {position})")]
    EmbeddedNul { position: usize },
}
