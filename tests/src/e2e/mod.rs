//! End to end literal obfuscation tests.
//!
//! Each test runs the full pipeline (blacklist collection, rewriting, import fixing) over
//! the sample package and checks the rewritten source:
//!   - every replacement evaluates to the literal it replaced
//!   - no replaced literal survives in the printed source
//!   - constants that must stay constant are left alone
//!   - the output is a pure function of the input and the seed

mod pipeline;
