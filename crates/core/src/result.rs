//! Core results and error types

use thiserror::Error;

/// Core error type encompassing all core module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid hexadecimal in seed.
    #[error("invalid hexadecimal in seed")]
    InvalidSeedHex,

    /// Invalid seed length.
    #[error("invalid seed length: expected 64 hex chars, got {0}")]
    InvalidSeedLength(usize),

    /// Literal token text does not denote a value.
    #[error("malformed literal {text}: {reason}")]
    MalformedLiteral {
        /// The literal token text as written in source.
        text: String,
        /// Why decoding failed.
        reason: String,
    },

    /// Package serialization or deserialization failed.
    #[error("package serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
