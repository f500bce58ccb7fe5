//! Replacement verification for litmask.
//!
//! Every replacement the rewriter records carries the value of the literal it replaced.
//! This crate evaluates the synthesized expression with a small reference interpreter and
//! checks that it reproduces that value bit for bit.

pub mod result;
pub mod semantics;
pub mod value;

pub use result::{Error, Result};
pub use semantics::Evaluator;
pub use value::Value;

use litmask_transform::{LiteralValue, ObfuscationReport, Replacement};

/// Evaluates `replacement` and compares the result with the literal it replaced.
pub fn verify_replacement(replacement: &Replacement) -> Result<()> {
    let value = Evaluator::new().eval(&replacement.expr)?;
    if matches_original(&replacement.original, value.unnamed()) {
        tracing::debug!(
            "verified {} replacement via {}",
            replacement.typ,
            replacement.strategy
        );
        Ok(())
    } else {
        Err(Error::Mismatch {
            typ: replacement.typ.clone(),
            expected: format!("{:?}", replacement.original),
            found: value.to_string(),
        })
    }
}

/// Verifies every replacement in `report` and returns how many were checked.
pub fn verify_report(report: &ObfuscationReport) -> Result<usize> {
    let mut checked = 0;
    for file in &report.files {
        for replacement in &file.replacements {
            verify_replacement(replacement).inspect_err(|e| {
                tracing::warn!("{}: replacement failed verification: {}", file.file, e)
            })?;
            checked += 1;
        }
    }
    tracing::info!("verified {} replacements", checked);
    Ok(checked)
}

/// Returns true if `value` is exactly the literal `original`. Floats compare by bits.
pub fn matches_original(original: &LiteralValue, value: &Value) -> bool {
    match (original, value) {
        (LiteralValue::Str(a), Value::Str(b))
        | (LiteralValue::Bytes(a), Value::Bytes(b))
        | (LiteralValue::Array(a), Value::Array(b)) => a == b,
        (LiteralValue::Int { bits, kind }, Value::Int { bits: b, kind: k }) => {
            bits == b && kind == k
        }
        (LiteralValue::Float { value, kind }, Value::Float { value: v, kind: k }) => {
            kind == k && value.to_bits() == v.to_bits()
        }
        (LiteralValue::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    }
}
