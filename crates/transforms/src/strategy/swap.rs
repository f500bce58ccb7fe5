//! Pairwise swap encoding.
//!
//! The encoder walks a list of index pairs and, for each pair, swaps the two bytes while
//! masking them with a key derived from the pair. Every step is its own inverse, so the
//! decoder replays the pairs in reverse order:
//!
//! ```go
//! data := []byte{...}
//! positions := []int{3, 0, 1, 2}
//! key := byte(0x9c)
//! for i := len(positions) - 2; i >= 0; i -= 2 {
//!     local := key + byte(i) + byte(positions[i]^positions[i+1])
//!     data[positions[i]], data[positions[i+1]] = data[positions[i+1]]^local, data[positions[i]]^local
//! }
//! ```

use super::{DecodeBlock, Strategy};
use crate::builder::{self, binary, ident, index, int_lit};
use litmask_core::ast::{AssignToken, BinaryOp, Block, Expr, ExprKind, Stmt, TypeExpr};
use rand::{Rng, rngs::StdRng, seq::SliceRandom};

/// Upper bound on the extra random pairs added after the covering ones.
const MAX_EXTRA_PAIRS: usize = 8;

/// Swap byte pairs under a per-pair mask.
#[derive(Default)]
pub struct Swap;

impl Swap {
    pub fn new() -> Self {
        Self
    }
}

/// Mask applied to the pair starting at `positions[i]`.
fn local_key(key: u8, i: usize, a: usize, b: usize) -> u8 {
    key.wrapping_add(i as u8).wrapping_add((a ^ b) as u8)
}

/// Builds the pair list. The first pairs cover every index at least once; a lone leftover
/// index may pair with itself, which masks it in place.
fn generate_positions(len: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    if order.len() % 2 == 1 {
        order.push(rng.random_range(0..len));
    }
    for _ in 0..rng.random_range(0..=MAX_EXTRA_PAIRS.min(len)) {
        order.push(rng.random_range(0..len));
        order.push(rng.random_range(0..len));
    }
    order
}

/// Applies the swap steps front to back.
pub(crate) fn encode(data: &[u8], positions: &[usize], key: u8) -> Vec<u8> {
    let mut out = data.to_vec();
    for (pair, chunk) in positions.chunks_exact(2).enumerate() {
        let (a, b) = (chunk[0], chunk[1]);
        let local = local_key(key, pair * 2, a, b);
        let (x, y) = (out[b] ^ local, out[a] ^ local);
        out[a] = x;
        out[b] = y;
    }
    out
}

fn positions_lit(positions: &[usize]) -> Expr {
    Expr::new(ExprKind::CompositeLit {
        typ: Some(TypeExpr::Array {
            len: None,
            elem: Box::new(TypeExpr::name("int")),
        }),
        elts: positions.iter().map(|&p| int_lit(p as u64)).collect(),
    })
}

fn decode_loop() -> Stmt {
    let at = |offset: Option<u64>| {
        let idx = match offset {
            Some(n) => binary(BinaryOp::Add, ident("i"), int_lit(n)),
            None => ident("i"),
        };
        index(ident("positions"), idx)
    };
    let local = binary(
        BinaryOp::Add,
        binary(
            BinaryOp::Add,
            ident("key"),
            builder::convert_named("byte", ident("i")),
        ),
        builder::convert_named("byte", binary(BinaryOp::Xor, at(None), at(Some(1)))),
    );
    let swap = Stmt::Assign {
        lhs: vec![index(ident("data"), at(None)), index(ident("data"), at(Some(1)))],
        tok: AssignToken::Assign,
        rhs: vec![
            binary(BinaryOp::Xor, index(ident("data"), at(Some(1))), ident("local")),
            binary(BinaryOp::Xor, index(ident("data"), at(None)), ident("local")),
        ],
    };
    Stmt::For {
        init: Some(Box::new(builder::define(
            "i",
            binary(
                BinaryOp::Sub,
                builder::len_of(ident("positions")),
                int_lit(2),
            ),
        ))),
        cond: Some(binary(BinaryOp::Geq, ident("i"), int_lit(0))),
        post: Some(Box::new(Stmt::Assign {
            lhs: vec![ident("i")],
            tok: AssignToken::Op(BinaryOp::Sub),
            rhs: vec![int_lit(2)],
        })),
        body: Block::new(vec![builder::define("local", local), swap]),
    }
}

impl Strategy for Swap {
    fn name(&self) -> &'static str {
        "swap"
    }

    fn obfuscate(&self, data: &[u8], rng: &mut StdRng) -> DecodeBlock {
        if data.is_empty() {
            return DecodeBlock {
                stmts: Vec::new(),
                result: builder::byte_slice_lit(&[]),
            };
        }

        let key: u8 = rng.random();
        let positions = generate_positions(data.len(), rng);
        let encoded = encode(data, &positions, key);

        DecodeBlock {
            stmts: vec![
                builder::define("data", builder::byte_slice_lit(&encoded)),
                builder::define("positions", positions_lit(&positions)),
                builder::define("key", builder::convert_named("byte", builder::byte_lit(key))),
                decode_loop(),
            ],
            result: ident("data"),
        }
    }
}
