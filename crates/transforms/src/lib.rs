pub mod blacklist;
pub mod builder;
pub mod imports;
pub mod literals;
pub mod number;
pub mod obfuscator;
pub mod strategy;

pub use blacklist::{Blacklist, BlacklistNode, ConstBlacklist};
pub use literals::{FileReport, LiteralObfuscator, LiteralValue, Replacement, Role};
pub use obfuscator::{obfuscate_literals, obfuscate_package, ObfuscationConfig, ObfuscationReport};
pub use strategy::{DecodeBlock, Strategy, StrategyPool};

use thiserror::Error;

/// Transform error type encompassing all transform module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Core operation failed.
    #[error("core operation failed: {0}")]
    Core(#[from] litmask_core::Error),

    /// A literal's text does not denote any value. The run is aborted.
    #[error("{file}: malformed literal {text}: {reason}")]
    MalformedLiteral {
        file: String,
        text: String,
        reason: String,
    },

    /// No strategies were configured.
    #[error("strategy pool is empty")]
    EmptyStrategyPool,

    /// A strategy name did not match any built-in strategy.
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
}

/// Transform result type
pub type Result<T> = std::result::Result<T, Error>;
