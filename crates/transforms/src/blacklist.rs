//! Eligibility analysis: symbols that must stay compile-time constants.
//!
//! Go only accepts constant expressions in a few places: array lengths, explicit keys of
//! array and slice literals, and the values of `const` declarations. Every object named
//! inside those places goes into the [`Blacklist`]; a `const` block declaring any of them
//! is never demoted to `var`.

use litmask_core::ast::{DeclToken, Expr, ExprKind, File, GenDecl, NodeId, Spec, TypeExpr};
use litmask_core::types::{ObjectId, TypeOracle};
use litmask_core::visit::{self, Visitor};
use std::collections::HashSet;
use tracing::debug;

/// Objects that must remain usable as compile-time constants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    objects: HashSet<ObjectId>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object, returning true if it was not present.
    pub fn insert(&mut self, obj: ObjectId) -> bool {
        self.objects.insert(obj)
    }

    pub fn contains(&self, obj: ObjectId) -> bool {
        self.objects.contains(&obj)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.iter().copied()
    }
}

impl FromIterator<ObjectId> for Blacklist {
    fn from_iter<I: IntoIterator<Item = ObjectId>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

/// A subtree the analyzer knows how to inspect.
#[derive(Debug, Clone, Copy)]
pub enum BlacklistNode<'n> {
    /// A composite literal; only array and slice literals contribute.
    CompositeLit(&'n Expr),
    /// An array type; only its length contributes.
    ArrayType(&'n TypeExpr),
    /// A declaration block; only `const` blocks contribute.
    GenDecl(&'n GenDecl),
}

/// The eligibility analyzer.
pub struct ConstBlacklist;

impl ConstBlacklist {
    /// Adds every object referenced from a constant-only position of `node`.
    ///
    /// Additive and idempotent: running it again over the same node adds nothing.
    pub fn analyze<O: TypeOracle + ?Sized>(
        node: BlacklistNode<'_>,
        oracle: &O,
        blacklist: &mut Blacklist,
    ) {
        let mut objects = ObjectCollector { oracle, blacklist };
        match node {
            BlacklistNode::CompositeLit(expr) => {
                let ExprKind::CompositeLit {
                    typ: Some(TypeExpr::Array { .. }),
                    elts,
                } = &expr.kind
                else {
                    return;
                };
                for elt in elts {
                    if let ExprKind::KeyValue { key, .. } = &elt.kind {
                        objects.visit_expr(key);
                    }
                }
            }
            BlacklistNode::ArrayType(typ) => {
                if let TypeExpr::Array { len: Some(len), .. } = typ {
                    objects.visit_expr(len);
                }
            }
            BlacklistNode::GenDecl(decl) => {
                if decl.tok != DeclToken::Const {
                    return;
                }
                for spec in &decl.specs {
                    if let Spec::Value(spec) = spec {
                        for value in &spec.values {
                            objects.visit_expr(value);
                        }
                    }
                }
            }
        }
    }

    /// Runs [`ConstBlacklist::analyze`] over every relevant subtree of every file.
    pub fn collect<O: TypeOracle + ?Sized>(files: &[File], oracle: &O) -> Blacklist {
        let mut blacklist = Blacklist::new();
        Self::extend(files, oracle, &mut blacklist);
        blacklist
    }

    /// Like [`ConstBlacklist::collect`], growing an existing blacklist.
    pub fn extend<O: TypeOracle + ?Sized>(files: &[File], oracle: &O, blacklist: &mut Blacklist) {
        let before = blacklist.len();
        let mut collector = NodeCollector {
            oracle,
            blacklist: &mut *blacklist,
        };
        for file in files {
            collector.visit_file(file);
        }
        debug!(
            "blacklist: {} objects ({} new) across {} files",
            blacklist.len(),
            blacklist.len() - before,
            files.len()
        );
    }
}

/// Inserts the object behind every identifier it sees.
struct ObjectCollector<'o, 'b, O: ?Sized> {
    oracle: &'o O,
    blacklist: &'b mut Blacklist,
}

impl<O: TypeOracle + ?Sized> Visitor for ObjectCollector<'_, '_, O> {
    fn visit_ident(&mut self, id: NodeId, name: &str) {
        if let Some(obj) = self.oracle.object_of(id) {
            if self.blacklist.insert(obj) {
                debug!("blacklisted {name}");
            }
        }
    }
}

/// Feeds every composite literal, array type and declaration block to the analyzer.
struct NodeCollector<'o, 'b, O: ?Sized> {
    oracle: &'o O,
    blacklist: &'b mut Blacklist,
}

impl<O: TypeOracle + ?Sized> Visitor for NodeCollector<'_, '_, O> {
    fn visit_gen_decl(&mut self, decl: &GenDecl) {
        ConstBlacklist::analyze(BlacklistNode::GenDecl(decl), self.oracle, self.blacklist);
        visit::walk_gen_decl(self, decl);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if matches!(expr.kind, ExprKind::CompositeLit { .. }) {
            ConstBlacklist::analyze(BlacklistNode::CompositeLit(expr), self.oracle, self.blacklist);
        }
        visit::walk_expr(self, expr);
    }

    fn visit_type(&mut self, typ: &TypeExpr) {
        if matches!(typ, TypeExpr::Array { .. }) {
            ConstBlacklist::analyze(BlacklistNode::ArrayType(typ), self.oracle, self.blacklist);
        }
        visit::walk_type(self, typ);
    }
}
