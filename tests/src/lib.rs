//! Integration tests for the litmask workspace.
//!
//! Tests are grouped by crate (`core`, `transforms`) plus end-to-end runs of the whole
//! pipeline over a small sample package (`e2e`).

#[cfg(test)]
mod core;
#[cfg(test)]
mod e2e;
#[cfg(test)]
mod transforms;
