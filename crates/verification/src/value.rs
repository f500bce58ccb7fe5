//! Runtime values of the evaluated Go subset.
//!
//! Integers are stored as two's-complement bits truncated to the width of their kind, so
//! arithmetic wraps exactly as it does in Go. Untyped constants are 64 bits wide.

use crate::{Error, Result};
use litmask_core::ast::{BinaryOp, UnaryOp};
use litmask_core::types::BasicKind;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int { bits: u64, kind: BasicKind },
    Float { value: f64, kind: BasicKind },
    Bool(bool),
    /// String content as raw bytes.
    Str(Vec<u8>),
    /// A `[]byte`. A nil slice is empty.
    Bytes(Vec<u8>),
    /// A `[N]byte`.
    Array(Vec<u8>),
    /// Any other slice, e.g. `[]int` or `[][]byte`.
    List(Vec<Value>),
    /// A value converted to a locally declared named type.
    Named { name: String, value: Box<Value> },
    /// The address of a value, optionally viewed as pointing to another basic kind.
    Pointer {
        target: Box<Value>,
        view: Option<BasicKind>,
    },
}

fn width(kind: BasicKind) -> u32 {
    kind.bit_size().unwrap_or(64)
}

fn truncate(bits: u64, kind: BasicKind) -> u64 {
    match width(kind) {
        64 => bits,
        w => bits & ((1u64 << w) - 1),
    }
}

fn is_signed(kind: BasicKind) -> bool {
    kind.is_integer() && !kind.is_unsigned()
}

fn sign_extend(bits: u64, kind: BasicKind) -> i64 {
    let w = width(kind);
    if w == 64 {
        return bits as i64;
    }
    let shift = 64 - w;
    ((bits << shift) as i64) >> shift
}

impl Value {
    /// An integer of `kind`, truncated to its width.
    pub fn int(bits: u64, kind: BasicKind) -> Self {
        Value::Int {
            bits: truncate(bits, kind),
            kind,
        }
    }

    pub fn byte(b: u8) -> Self {
        Value::Int {
            bits: u64::from(b),
            kind: BasicKind::Uint8,
        }
    }

    /// The integer as a non-negative index.
    pub fn as_index(&self) -> Result<u64> {
        match self {
            Value::Int { bits, kind } => {
                if is_signed(*kind) && sign_extend(*bits, *kind) < 0 {
                    return Err(Error::Type(format!("negative index {}", self)));
                }
                Ok(*bits)
            }
            other => Err(Error::Type(format!("{other} is not an integer"))),
        }
    }

    /// The integer truncated to a byte, as stored into a byte slice or array.
    pub fn as_byte(&self) -> Result<u8> {
        match self {
            Value::Int { bits, .. } => Ok(*bits as u8),
            other => Err(Error::Type(format!("{other} is not a byte"))),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Named { value, .. } => value.as_bool(),
            other => Err(Error::Type(format!("{other} is not a bool"))),
        }
    }

    /// Strips named-type wrappers.
    pub fn unnamed(&self) -> &Value {
        match self {
            Value::Named { value, .. } => value.unnamed(),
            other => other,
        }
    }

    /// Go conversion `kind(self)`.
    pub fn convert(&self, kind: BasicKind) -> Result<Value> {
        match (self.unnamed(), kind) {
            (Value::Int { bits, kind: from }, to) if to.is_integer() => {
                let bits = if is_signed(*from) {
                    sign_extend(*bits, *from) as u64
                } else {
                    *bits
                };
                Ok(Value::int(bits, to))
            }
            (Value::Int { bits, kind: from }, to) if to.is_float() => {
                let value = if is_signed(*from) {
                    sign_extend(*bits, *from) as f64
                } else {
                    *bits as f64
                };
                Ok(Value::float(value, to))
            }
            (Value::Float { value, .. }, to) if to.is_float() => Ok(Value::float(*value, to)),
            (Value::Bytes(data) | Value::Str(data), BasicKind::String) => {
                Ok(Value::Str(data.clone()))
            }
            (Value::Bool(b), BasicKind::Bool) => Ok(Value::Bool(*b)),
            (value, to) => Err(Error::Unsupported(format!("conversion of {value} to {to}"))),
        }
    }

    fn float(value: f64, kind: BasicKind) -> Value {
        let value = if kind == BasicKind::Float32 {
            f64::from(value as f32)
        } else {
            value
        };
        Value::Float { value, kind }
    }

    pub fn unary(op: UnaryOp, x: &Value) -> Result<Value> {
        match (op, x.unnamed()) {
            (UnaryOp::Pos, value) => Ok(value.clone()),
            (UnaryOp::Neg, Value::Int { bits, kind }) => Ok(Value::int(bits.wrapping_neg(), *kind)),
            (UnaryOp::Neg, Value::Float { value, kind }) => Ok(Value::float(-value, *kind)),
            (UnaryOp::BitNot, Value::Int { bits, kind }) => Ok(Value::int(!bits, *kind)),
            (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (op, value) => Err(Error::Unsupported(format!("{}{value}", op.as_str()))),
        }
    }

    pub fn binary(op: BinaryOp, x: &Value, y: &Value) -> Result<Value> {
        match (x.unnamed(), y.unnamed()) {
            (Value::Bool(a), Value::Bool(b)) => match op {
                BinaryOp::LAnd => Ok(Value::Bool(*a && *b)),
                BinaryOp::LOr => Ok(Value::Bool(*a || *b)),
                BinaryOp::Eql => Ok(Value::Bool(a == b)),
                BinaryOp::Neq => Ok(Value::Bool(a != b)),
                _ => Err(Error::Unsupported(format!("bool {op}"))),
            },
            (Value::Int { .. }, Value::Int { .. }) => int_binary(op, x.unnamed(), y.unnamed()),
            (Value::Str(a), Value::Str(b)) => match op {
                BinaryOp::Add => Ok(Value::Str([a.as_slice(), b.as_slice()].concat())),
                BinaryOp::Eql => Ok(Value::Bool(a == b)),
                BinaryOp::Neq => Ok(Value::Bool(a != b)),
                _ => Err(Error::Unsupported(format!("string {op}"))),
            },
            (a, b) => Err(Error::Unsupported(format!("{a} {op} {b}"))),
        }
    }
}

/// Picks the kind both operands are converted to: the typed one wins over an untyped one.
fn unify(a: BasicKind, b: BasicKind) -> Result<BasicKind> {
    match (a.is_untyped(), b.is_untyped()) {
        (true, false) => Ok(b),
        (false, true) | (true, true) => Ok(a),
        (false, false) if a == b => Ok(a),
        _ => Err(Error::Type(format!("mismatched types {a} and {b}"))),
    }
}

fn int_binary(op: BinaryOp, x: &Value, y: &Value) -> Result<Value> {
    let (Value::Int { bits: xb, kind: xk }, Value::Int { bits: yb, kind: yk }) = (x, y) else {
        return Err(Error::Type("integer operands expected".into()));
    };

    if matches!(op, BinaryOp::Shl | BinaryOp::Shr) {
        let count = y.as_index()?;
        let bits = match op {
            BinaryOp::Shl if count >= 64 => 0,
            BinaryOp::Shl => xb << count,
            _ if is_signed(*xk) => {
                (sign_extend(*xb, *xk) >> count.min(63)) as u64
            }
            _ if count >= 64 => 0,
            _ => xb >> count,
        };
        return Ok(Value::int(bits, *xk));
    }

    let kind = unify(*xk, *yk)?;
    let a = x.convert(kind)?;
    let b = y.convert(kind)?;
    let (Value::Int { bits: a, .. }, Value::Int { bits: b, .. }) = (a, b) else {
        return Err(Error::Type("integer operands expected".into()));
    };
    let signed = is_signed(kind);
    let (sa, sb) = (sign_extend(a, kind), sign_extend(b, kind));

    let bits = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Quo | BinaryOp::Rem if b == 0 => return Err(Error::DivisionByZero),
        BinaryOp::Quo if signed => sa.wrapping_div(sb) as u64,
        BinaryOp::Quo => truncate(a, kind) / truncate(b, kind),
        BinaryOp::Rem if signed => sa.wrapping_rem(sb) as u64,
        BinaryOp::Rem => truncate(a, kind) % truncate(b, kind),
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::AndNot => a & !b,
        BinaryOp::Eql => return Ok(Value::Bool(a == b)),
        BinaryOp::Neq => return Ok(Value::Bool(a != b)),
        BinaryOp::Lss | BinaryOp::Leq | BinaryOp::Gtr | BinaryOp::Geq => {
            let ordering = if signed { sa.cmp(&sb) } else { a.cmp(&b) };
            return Ok(Value::Bool(match op {
                BinaryOp::Lss => ordering.is_lt(),
                BinaryOp::Leq => ordering.is_le(),
                BinaryOp::Gtr => ordering.is_gt(),
                _ => ordering.is_ge(),
            }));
        }
        other => return Err(Error::Unsupported(format!("integer {other}"))),
    };
    Ok(Value::int(bits, kind))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int { bits, kind } if is_signed(*kind) => {
                write!(f, "{}({})", kind, sign_extend(*bits, *kind))
            }
            Value::Int { bits, kind } => write!(f, "{kind}({bits})"),
            Value::Float { value, kind } => write!(f, "{kind}({value})"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(data) => write!(f, "{:?}", String::from_utf8_lossy(data)),
            Value::Bytes(data) => write!(f, "[]byte{data:?}"),
            Value::Array(data) => write!(f, "[{}]byte{data:?}", data.len()),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Named { name, value } => write!(f, "{name}({value})"),
            Value::Pointer { target, .. } => write!(f, "&{target}"),
        }
    }
}
