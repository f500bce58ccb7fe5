//! Verification results and error types

use thiserror::Error;

/// Main error type for verification operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported construct: {0}")]
    Unsupported(String),
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
    #[error("type error: {0}")]
    Type(String),
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: u64, len: usize },
    #[error("integer division by zero")]
    DivisionByZero,
    #[error("step limit of {0} exceeded")]
    StepLimit(usize),
    #[error("function literal finished without returning")]
    MissingReturn,
    #[error("replacement of type {typ} evaluates to {found}, expected {expected}")]
    Mismatch {
        typ: String,
        expected: String,
        found: String,
    },
}

/// Result type for verification operations
pub type Result<T> = std::result::Result<T, Error>;
