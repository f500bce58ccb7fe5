//! Numeric and boolean literal obfuscation.
//!
//! Integers are truncated to their type's width, encoded little-endian through a strategy
//! and rebuilt by OR-ing shifted bytes:
//!
//! ```go
//! func() int16 {
//!     data := ...
//!     return int16(uint16(data[0]) | uint16(data[1])<<8)
//! }()
//! ```
//!
//! Floats take the same route for their IEEE-754 bits and are reinterpreted through
//! `unsafe.Pointer`, which is why float replacements require the `unsafe` import.

use crate::builder::{self, binary, ident, index, int_lit};
use crate::literals::LiteralValue;
use crate::strategy::StrategyPool;
use litmask_core::ast::{BasicLit, BinaryOp, Expr, LitKind, TypeExpr};
use litmask_core::literal;
use litmask_core::types::{BasicKind, Type};
use rand::{Rng, rngs::StdRng};
use tracing::{debug, warn};

/// A numeric or boolean replacement ready to be spliced into the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberReplacement {
    pub expr: Expr,
    pub value: LiteralValue,
    pub strategy: &'static str,
    /// The expression reinterprets memory and needs the `unsafe` import.
    pub needs_unsafe: bool,
}

/// The basic kind a numeric literal is rebuilt as, plus the local named type wrapping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericTarget {
    pub kind: BasicKind,
    pub named: Option<String>,
}

impl NumericTarget {
    /// Resolves the rebuild target for a literal of static type `typ`.
    ///
    /// Untyped integers and floats take their default kind. Untyped runes, complex kinds
    /// and named types declared outside the package are not targets.
    pub fn resolve(typ: &Type) -> Option<Self> {
        let (kind, named) = match typ {
            Type::Basic(kind) => (*kind, None),
            Type::Named {
                name, local: true, ..
            } => match typ.underlying() {
                Type::Basic(kind) if !kind.is_untyped() => (*kind, Some(name.clone())),
                _ => return None,
            },
            _ => return None,
        };
        if kind == BasicKind::UntypedRune {
            return None;
        }
        let kind = kind.default_kind();
        if !(kind.is_integer() || kind.is_float()) || kind.bit_size().is_none() {
            return None;
        }
        Some(Self { kind, named })
    }

    fn type_expr(&self) -> TypeExpr {
        TypeExpr::name(self.kind.name())
    }

    fn wrap(&self, expr: Expr) -> Expr {
        match &self.named {
            Some(name) => builder::convert_named(name, expr),
            None => expr,
        }
    }
}

/// Replaces the literal `lit`, negated when `negative`, with a runtime computation of the
/// same value typed as `target`.
///
/// Returns `None` when the literal text cannot be represented in the target kind; the caller
/// leaves such literals untouched.
pub fn obfuscate_number(
    lit: &BasicLit,
    negative: bool,
    target: &NumericTarget,
    pool: &StrategyPool,
    rng: &mut StdRng,
) -> Option<NumberReplacement> {
    if !matches!(lit.kind, LitKind::Int | LitKind::Float) {
        return None;
    }
    let Some(value) = literal_value(lit, negative, target.kind) else {
        warn!(
            "skipping numeric literal {}{} that does not fit {}",
            if negative { "-" } else { "" },
            lit.value,
            target.kind
        );
        return None;
    };

    let (bits, width) = match value {
        LiteralValue::Int { bits, kind } => (bits, kind.bit_size()?),
        LiteralValue::Float { value, kind: BasicKind::Float32 } => {
            (u64::from((value as f32).to_bits()), 32)
        }
        LiteralValue::Float { value, .. } => (value.to_bits(), 64),
        _ => return None,
    };

    let strategy = pool.pick(rng);
    let bytes = bits.to_le_bytes();
    let block = strategy.obfuscate(&bytes[..(width / 8) as usize], rng);
    let (mut stmts, data) = block.into_named();
    let rebuilt = rebuild_bits(&data, width)?;

    let needs_unsafe = target.kind.is_float();
    let result = if needs_unsafe {
        stmts.push(builder::define("bits", rebuilt));
        builder::unsafe_reinterpret(target.kind, "bits")
    } else {
        builder::convert_basic(target.kind, rebuilt)
    };
    stmts.push(builder::return_stmt(result));

    debug!(
        "numeric literal {} rebuilt as {} via {}",
        lit.value,
        target.kind,
        strategy.name()
    );

    Some(NumberReplacement {
        expr: target.wrap(builder::lambda_call(target.type_expr(), stmts)),
        value,
        strategy: strategy.name(),
        needs_unsafe,
    })
}

/// Replaces a boolean constant with `<one-byte reconstruction> == 1`.
///
/// `true` encodes the byte `1`; `false` encodes any other byte.
pub fn obfuscate_bool(value: bool, pool: &StrategyPool, rng: &mut StdRng) -> NumberReplacement {
    let byte = if value {
        1
    } else {
        match rng.random_range(0u8..255) {
            1 => 0,
            other => other,
        }
    };
    let strategy = pool.pick(rng);
    let (mut stmts, data) = strategy.obfuscate(&[byte], rng).into_named();
    stmts.push(builder::return_stmt(index(ident(&data), int_lit(0))));
    let rebuilt = builder::lambda_call(TypeExpr::name(BasicKind::Uint8.name()), stmts);

    debug!("boolean {} rebuilt via {}", value, strategy.name());

    NumberReplacement {
        expr: binary(BinaryOp::Eql, rebuilt, int_lit(1)),
        value: LiteralValue::Bool(value),
        strategy: strategy.name(),
        needs_unsafe: false,
    }
}

/// Decodes the literal into the value it denotes once converted to `kind`.
fn literal_value(lit: &BasicLit, negative: bool, kind: BasicKind) -> Option<LiteralValue> {
    if kind.is_float() {
        let value = match (lit.kind, kind) {
            (LitKind::Float, BasicKind::Float32) => f64::from(literal::parse_float32(&lit.value)?),
            (LitKind::Float, _) => literal::parse_float(&lit.value)?,
            (_, BasicKind::Float32) => literal::parse_int(&lit.value)? as f32 as f64,
            _ => literal::parse_int(&lit.value)? as f64,
        };
        // Go constants have no negative zero
        let value = if negative && value != 0.0 { -value } else { value };
        return Some(LiteralValue::Float { value, kind });
    }

    let magnitude = match lit.kind {
        LitKind::Int => literal::parse_int(&lit.value)?,
        _ => {
            let value = literal::parse_float(&lit.value)?;
            if value.fract() != 0.0 || !(0.0..=u64::MAX as f64).contains(&value) {
                return None;
            }
            value as u64
        }
    };
    let width = kind.bit_size()?;
    if !fits(magnitude, negative, kind, width) {
        return None;
    }
    let raw = if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    };
    Some(LiteralValue::Int {
        bits: truncate(raw, width),
        kind,
    })
}

/// Reports whether the constant `±magnitude` is representable in `kind`.
fn fits(magnitude: u64, negative: bool, kind: BasicKind, width: u32) -> bool {
    if kind.is_unsigned() {
        return !negative || magnitude == 0;
    }
    let limit = 1u64 << (width - 1);
    if negative {
        magnitude <= limit
    } else {
        magnitude < limit
    }
}

fn truncate(bits: u64, width: u32) -> u64 {
    if width >= 64 {
        bits
    } else {
        bits & ((1u64 << width) - 1)
    }
}

/// `U(data[0]) | U(data[1])<<8 | ...` where `U` is the unsigned kind of `width` bits.
fn rebuild_bits(data: &str, width: u32) -> Option<Expr> {
    let unsigned = BasicKind::unsigned_of_width(width)?;
    let mut acc: Option<Expr> = None;
    for i in 0..u64::from(width / 8) {
        let byte = index(ident(data), int_lit(i));
        let part = if unsigned == BasicKind::Uint8 {
            byte
        } else {
            builder::convert_basic(unsigned, byte)
        };
        let part = if i == 0 {
            part
        } else {
            binary(BinaryOp::Shl, part, int_lit(i * 8))
        };
        acc = Some(match acc {
            Some(prev) => binary(BinaryOp::Or, prev, part),
            None => part,
        });
    }
    acc
}
