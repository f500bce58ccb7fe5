//! Chunked encoding.
//!
//! The input is cut into chunks, each masked with its own key byte and stored in shuffled
//! order. The decoder walks an order table and appends the unmasked chunks:
//!
//! ```go
//! chunks := [][]byte{{0x1f, 0x2e}, {0x77}, {0x05, 0x61, 0x3c}}
//! keys := []byte{0x4a, 0x90, 0x11}
//! order := []int{2, 0, 1}
//! var data []byte
//! for _, idx := range order {
//!     for _, b := range chunks[idx] {
//!         data = append(data, b^keys[idx])
//!     }
//! }
//! ```

use super::{DecodeBlock, Strategy};
use crate::builder::{self, binary, ident, index, int_lit};
use litmask_core::ast::{BinaryOp, Block, Expr, ExprKind, Stmt, TypeExpr};
use rand::{Rng, rngs::StdRng, seq::SliceRandom};

const MAX_CHUNKS: usize = 6;

/// Split into masked, shuffled chunks.
#[derive(Default)]
pub struct Split;

impl Split {
    pub fn new() -> Self {
        Self
    }
}

/// One stored chunk: its bytes already masked, and the key that unmasks them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Chunk {
    pub bytes: Vec<u8>,
    pub key: u8,
}

/// Cuts `data` into masked chunks. Returns the chunks in storage order and the order
/// table, where `order[j]` is the storage slot of the `j`-th chunk of the input.
pub(crate) fn encode(data: &[u8], rng: &mut StdRng) -> (Vec<Chunk>, Vec<usize>) {
    let count = rng.random_range(1..=data.len().clamp(1, MAX_CHUNKS));
    let mut cuts: Vec<usize> = (1..data.len()).collect();
    cuts.shuffle(rng);
    cuts.truncate(count - 1);
    cuts.sort_unstable();

    let mut pieces = Vec::with_capacity(count);
    let mut start = 0;
    for cut in cuts.into_iter().chain(std::iter::once(data.len())) {
        // a zero key would store the chunk in the clear
        let key = rng.random_range(1..=u8::MAX);
        pieces.push(Chunk {
            bytes: data[start..cut].iter().map(|b| b ^ key).collect(),
            key,
        });
        start = cut;
    }

    // slots[s] is the input position of the chunk stored at slot s
    let mut slots: Vec<usize> = (0..pieces.len()).collect();
    slots.shuffle(rng);
    let mut order = vec![0; pieces.len()];
    for (slot, &position) in slots.iter().enumerate() {
        order[position] = slot;
    }
    let stored = slots.iter().map(|&position| pieces[position].clone()).collect();
    (stored, order)
}

fn chunks_lit(chunks: &[Chunk]) -> Expr {
    Expr::new(ExprKind::CompositeLit {
        typ: Some(TypeExpr::Array {
            len: None,
            elem: Box::new(builder::byte_slice_type()),
        }),
        elts: chunks
            .iter()
            .map(|chunk| {
                Expr::new(ExprKind::CompositeLit {
                    typ: None,
                    elts: chunk.bytes.iter().copied().map(builder::byte_lit).collect(),
                })
            })
            .collect(),
    })
}

fn int_slice_lit(values: &[usize]) -> Expr {
    Expr::new(ExprKind::CompositeLit {
        typ: Some(TypeExpr::Array {
            len: None,
            elem: Box::new(TypeExpr::name("int")),
        }),
        elts: values.iter().map(|&v| int_lit(v as u64)).collect(),
    })
}

fn range_values(value: &str, x: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::Range {
        key: Some(ident("_")),
        value: Some(ident(value)),
        define: true,
        x,
        body: Block::new(body),
    }
}

impl Strategy for Split {
    fn name(&self) -> &'static str {
        "split"
    }

    fn obfuscate(&self, data: &[u8], rng: &mut StdRng) -> DecodeBlock {
        if data.is_empty() {
            return DecodeBlock {
                stmts: Vec::new(),
                result: builder::byte_slice_lit(&[]),
            };
        }

        let (chunks, order) = encode(data, rng);
        let keys: Vec<u8> = chunks.iter().map(|c| c.key).collect();

        let push = builder::assign(
            ident("data"),
            builder::call(
                ident("append"),
                vec![
                    ident("data"),
                    binary(
                        BinaryOp::Xor,
                        ident("b"),
                        index(ident("keys"), ident("idx")),
                    ),
                ],
            ),
        );
        let inner = range_values("b", index(ident("chunks"), ident("idx")), vec![push]);
        let outer = range_values("idx", ident("order"), vec![inner]);

        DecodeBlock {
            stmts: vec![
                builder::define("chunks", chunks_lit(&chunks)),
                builder::define("keys", builder::byte_slice_lit(&keys)),
                builder::define("order", int_slice_lit(&order)),
                builder::var_decl("data", builder::byte_slice_type()),
                outer,
            ],
            result: ident("data"),
        }
    }
}
