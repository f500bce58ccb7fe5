//! Byte-encoding strategies that synthesize decode routines.
//!
//! A strategy encodes a byte sequence with fresh random key material and returns the Go
//! statements that undo the encoding at run time. The rewriter picks one strategy at random
//! for every literal it replaces.

mod simple;
mod split;
mod swap;

pub use simple::Simple;
pub use split::Split;
pub use swap::Swap;

use crate::builder;
use crate::{Error, Result};
use litmask_core::ast::{Expr, Stmt};
use rand::Rng;
use rand::rngs::StdRng;

/// Statements that rebuild a byte sequence, followed by the expression holding it.
///
/// `result` has type `[]byte` once `stmts` have run.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeBlock {
    pub stmts: Vec<Stmt>,
    pub result: Expr,
}

impl DecodeBlock {
    /// Ensures the decoded bytes live in a named variable, so callers can index them
    /// without evaluating `result` twice.
    pub fn into_named(self) -> (Vec<Stmt>, String) {
        let DecodeBlock { mut stmts, result } = self;
        match result.as_ident() {
            Some(name) => {
                let name = name.to_string();
                (stmts, name)
            }
            None => {
                stmts.push(builder::define("decoded", result));
                (stmts, "decoded".to_string())
            }
        }
    }
}

/// A reversible byte encoding.
pub trait Strategy: Send + Sync {
    /// Returns the strategy's name for logging and reports.
    fn name(&self) -> &'static str;

    /// Encodes `data` and returns the routine that reproduces it.
    fn obfuscate(&self, data: &[u8], rng: &mut StdRng) -> DecodeBlock;
}

/// The set of strategies the rewriter chooses from.
pub struct StrategyPool {
    strategies: Vec<Box<dyn Strategy>>,
}

impl StrategyPool {
    /// Creates a pool from custom strategies. The pool must not be empty.
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Result<Self> {
        if strategies.is_empty() {
            return Err(Error::EmptyStrategyPool);
        }
        Ok(Self { strategies })
    }

    /// Builds a pool from a comma-separated list of built-in strategy names.
    pub fn from_names(list: &str) -> Result<Self> {
        let strategies = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|name| match name {
                "simple" => Ok(Box::new(Simple) as Box<dyn Strategy>),
                "swap" => Ok(Box::new(Swap) as Box<dyn Strategy>),
                "split" => Ok(Box::new(Split) as Box<dyn Strategy>),
                other => Err(Error::UnknownStrategy(other.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(strategies)
    }

    /// Picks a strategy uniformly at random.
    pub fn pick(&self, rng: &mut StdRng) -> &dyn Strategy {
        let idx = rng.random_range(0..self.strategies.len());
        self.strategies[idx].as_ref()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for StrategyPool {
    fn default() -> Self {
        Self {
            strategies: vec![Box::new(Simple), Box::new(Swap), Box::new(Split)],
        }
    }
}

impl std::fmt::Debug for StrategyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyPool")
            .field("strategies", &self.names())
            .finish()
    }
}
