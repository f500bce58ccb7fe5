//! Single-key byte encoding.
//!
//! ```go
//! key := []byte{0x5e, 0x01, ...}
//! data := []byte{0x36, 0x64, ...}
//! for i := range data {
//!     data[i] = data[i] ^ key[i]
//! }
//! ```
//!
//! The combining operator is drawn per literal from `^`, `+` and `-`; byte arithmetic
//! wraps in both Rust and Go so the encoder can mirror it exactly.

use super::{DecodeBlock, Strategy};
use crate::builder::{self, ident, index};
use litmask_core::ast::BinaryOp;
use rand::{Rng, rngs::StdRng};

/// Combine every byte with a same-length random key.
#[derive(Default)]
pub struct Simple;

impl Simple {
    pub fn new() -> Self {
        Self
    }
}

/// Encodes one byte so that `decode_op(encoded, key) == plain`.
pub(crate) fn encode_byte(op: BinaryOp, plain: u8, key: u8) -> u8 {
    match op {
        BinaryOp::Add => plain.wrapping_sub(key),
        BinaryOp::Sub => plain.wrapping_add(key),
        _ => plain ^ key,
    }
}

/// Key bytes are never zero: a zero byte leaves its data byte unchanged under every operator.
pub(crate) fn draw_key(len: usize, rng: &mut StdRng) -> Vec<u8> {
    (0..len).map(|_| rng.random_range(1..=u8::MAX)).collect()
}

impl Strategy for Simple {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn obfuscate(&self, data: &[u8], rng: &mut StdRng) -> DecodeBlock {
        let key = draw_key(data.len(), rng);
        let op = [BinaryOp::Xor, BinaryOp::Add, BinaryOp::Sub][rng.random_range(0..3)];

        let encoded: Vec<u8> = data
            .iter()
            .zip(&key)
            .map(|(&plain, &k)| encode_byte(op, plain, k))
            .collect();

        let step = builder::assign(
            index(ident("data"), ident("i")),
            builder::binary(
                op,
                index(ident("data"), ident("i")),
                index(ident("key"), ident("i")),
            ),
        );

        DecodeBlock {
            stmts: vec![
                builder::define("key", builder::byte_slice_lit(&key)),
                builder::define("data", builder::byte_slice_lit(&encoded)),
                builder::range_loop("i", ident("data"), vec![step]),
            ],
            result: ident("data"),
        }
    }
}
