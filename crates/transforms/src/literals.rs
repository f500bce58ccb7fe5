//! The literal rewriter.
//!
//! A file is rewritten in two phases per node. On the way down, `const` blocks whose names
//! are all typed basic constants outside the blacklist are demoted to `var`; any other
//! `const` block is left alone together with everything inside it. On the way up, byte
//! array and slice literals, numeric and string literals in data positions, and the
//! universe booleans are replaced by immediately invoked decode routines.
//!
//! Type expressions and import specs are never visited, so array lengths, struct tags and
//! import paths keep their literals.

use crate::blacklist::Blacklist;
use crate::builder::{self, ident, index};
use crate::imports;
use crate::number::{self, NumberReplacement, NumericTarget};
use crate::strategy::StrategyPool;
use crate::{Error, Result};
use litmask_core::ast::{
    Block, Decl, DeclToken, Expr, ExprKind, File, GenDecl, LitKind, NodeId, Spec, Stmt,
    TypeExpr, UnaryOp, ValueSpec,
};
use litmask_core::literal;
use litmask_core::types::{BasicKind, Type, TypeOracle};
use litmask_core::visit::{self, Visitor};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Structural role of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Value list of a `var` or `const` spec.
    Values,
    /// Right-hand side of an assignment.
    Rhs,
    /// Value of a key/value element.
    Value,
    /// Call argument.
    Args,
    /// Primary operand: unary and binary left side, parenthesized, indexed, ranged over,
    /// expression statements.
    X,
    /// Right operand of a binary expression.
    Y,
    /// Return values.
    Results,
    Lhs,
    Key,
    Index,
    Fun,
    Cond,
    Tag,
    /// Case clause labels.
    List,
    /// Composite literal elements.
    Elts,
}

impl Role {
    /// Roles in which a basic literal holds plain data.
    pub fn is_data(self) -> bool {
        matches!(
            self,
            Role::Values | Role::Rhs | Role::Value | Role::Args | Role::X | Role::Y | Role::Results
        )
    }

    /// Roles in which a negated literal is rewritten as a whole.
    pub fn is_unary_data(self) -> bool {
        matches!(
            self,
            Role::Values | Role::Rhs | Role::Value | Role::Args | Role::X
        )
    }
}

/// The value a replacement reproduces at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    /// String content as raw bytes.
    Str(Vec<u8>),
    /// `[]byte{...}`
    Bytes(Vec<u8>),
    /// `[N]byte{...}`
    Array(Vec<u8>),
    /// Two's-complement bits truncated to the width of `kind`.
    Int { bits: u64, kind: BasicKind },
    Float { value: f64, kind: BasicKind },
    Bool(bool),
}

/// One rewritten literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    pub original: LiteralValue,
    /// Go spelling of the static type the replacement evaluates to.
    pub typ: String,
    pub strategy: String,
    pub expr: Expr,
}

/// Per-literal-kind totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralCounts {
    pub strings: usize,
    pub bytes: usize,
    pub ints: usize,
    pub floats: usize,
    pub bools: usize,
}

impl LiteralCounts {
    pub fn total(&self) -> usize {
        self.strings + self.bytes + self.ints + self.floats + self.bools
    }

    pub fn add(&mut self, other: &LiteralCounts) {
        self.strings += other.strings;
        self.bytes += other.bytes;
        self.ints += other.ints;
        self.floats += other.floats;
        self.bools += other.bools;
    }
}

/// What happened to one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub file: String,
    /// `const` blocks turned into `var` blocks.
    pub demoted: usize,
    /// Whether `unsafe` was imported.
    pub added_unsafe: bool,
    pub replacements: Vec<Replacement>,
}

impl FileReport {
    pub fn counts(&self) -> LiteralCounts {
        let mut counts = LiteralCounts::default();
        for replacement in &self.replacements {
            match replacement.original {
                LiteralValue::Str(_) => counts.strings += 1,
                LiteralValue::Bytes(_) | LiteralValue::Array(_) => counts.bytes += 1,
                LiteralValue::Int { .. } => counts.ints += 1,
                LiteralValue::Float { .. } => counts.floats += 1,
                LiteralValue::Bool(_) => counts.bools += 1,
            }
        }
        counts
    }
}

/// Accumulator threaded through the traversal of a single file.
#[derive(Debug, Default)]
pub struct FileContext {
    pub file: String,
    /// Some replacement reinterprets memory through `unsafe.Pointer`.
    pub needs_unsafe: bool,
    pub demoted: usize,
    pub replacements: Vec<Replacement>,
}

impl FileContext {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    fn record(&mut self, original: LiteralValue, typ: String, strategy: &str, expr: &Expr) {
        self.replacements.push(Replacement {
            original,
            typ,
            strategy: strategy.to_string(),
            expr: expr.clone(),
        });
    }

    fn into_report(self, added_unsafe: bool) -> FileReport {
        FileReport {
            file: self.file,
            demoted: self.demoted,
            added_unsafe,
            replacements: self.replacements,
        }
    }
}

/// Rewrites the literals of one file at a time.
pub struct LiteralObfuscator<'a, O: TypeOracle + ?Sized> {
    oracle: &'a O,
    blacklist: &'a Blacklist,
    strategies: &'a StrategyPool,
    rng: &'a mut StdRng,
}

impl<'a, O: TypeOracle + ?Sized> LiteralObfuscator<'a, O> {
    pub fn new(
        oracle: &'a O,
        blacklist: &'a Blacklist,
        strategies: &'a StrategyPool,
        rng: &'a mut StdRng,
    ) -> Self {
        Self {
            oracle,
            blacklist,
            strategies,
            rng,
        }
    }

    /// Rewrites `file` in place and adds the `unsafe` import if a replacement needs it.
    ///
    /// On error the file may be partially rewritten and must be discarded.
    pub fn obfuscate_file(&mut self, file: &mut File) -> Result<FileReport> {
        let mut ctx = FileContext::new(&file.name);
        for decl in &mut file.decls {
            match decl {
                Decl::Gen(decl) => self.gen_decl(decl, &mut ctx)?,
                Decl::Func(func) => {
                    if let Some(body) = &mut func.body {
                        self.block(body, &mut ctx)?;
                    }
                }
            }
        }

        let added_unsafe = ctx.needs_unsafe && imports::add_import(file, "unsafe");
        let report = ctx.into_report(added_unsafe);
        let counts = report.counts();
        info!(
            "{}: {} literals replaced ({} strings, {} byte sequences, {} ints, {} floats, {} bools), {} const blocks demoted",
            report.file,
            counts.total(),
            counts.strings,
            counts.bytes,
            counts.ints,
            counts.floats,
            counts.bools,
            report.demoted
        );
        Ok(report)
    }

    fn gen_decl(&mut self, decl: &mut GenDecl, ctx: &mut FileContext) -> Result<()> {
        match decl.tok {
            DeclToken::Type => return Ok(()),
            DeclToken::Const => {
                if !self.can_demote(decl) {
                    return Ok(());
                }
                decl.tok = DeclToken::Var;
                ctx.demoted += 1;
            }
            DeclToken::Var => {}
        }

        for spec in &mut decl.specs {
            if let Spec::Value(spec) = spec {
                self.value_spec(spec, ctx)?;
            }
        }
        Ok(())
    }

    /// A `const` block may become a `var` block only if every name is a typed basic
    /// constant outside the blacklist and every spec spells its values out.
    fn can_demote(&self, decl: &GenDecl) -> bool {
        for spec in &decl.specs {
            let Spec::Value(spec) = spec else {
                return false;
            };
            // implicit repetition and iota only exist in const blocks
            if spec.values.is_empty() || spec.values.iter().any(mentions_iota) {
                debug!("keeping const block: implicit values or iota");
                return false;
            }
            for name in &spec.names {
                let Some(obj) = self.oracle.object_of(name.id) else {
                    return false;
                };
                let Some(object) = self.oracle.object(obj) else {
                    return false;
                };
                match object.typ {
                    Type::Basic(kind) if !kind.is_untyped() => {}
                    _ => {
                        debug!("keeping const block: {} is {}", name.name, object.typ);
                        return false;
                    }
                }
                if self.blacklist.contains(obj) {
                    debug!("keeping const block: {} is blacklisted", name.name);
                    return false;
                }
            }
        }
        true
    }

    fn value_spec(&mut self, spec: &mut ValueSpec, ctx: &mut FileContext) -> Result<()> {
        for (i, value) in spec.values.iter_mut().enumerate() {
            // a negated literal takes the declared type when one is spelled out
            let declared = match (&spec.typ, spec.names.get(i)) {
                (Some(_), Some(name)) => self.object_type(name.id),
                _ => None,
            };
            if declared.is_some() && negated_literal(value).is_some() {
                self.negation(value, Role::Values, declared, ctx);
            } else {
                self.expr(value, Role::Values, ctx)?;
            }
        }
        Ok(())
    }

    fn block(&mut self, block: &mut Block, ctx: &mut FileContext) -> Result<()> {
        for stmt in &mut block.stmts {
            self.stmt(stmt, ctx)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &mut Stmt, ctx: &mut FileContext) -> Result<()> {
        match stmt {
            Stmt::Decl(decl) => self.gen_decl(decl, ctx)?,
            Stmt::Expr(expr) => self.expr(expr, Role::X, ctx)?,
            Stmt::Assign { lhs, rhs, .. } => {
                for expr in lhs {
                    self.expr(expr, Role::Lhs, ctx)?;
                }
                for expr in rhs {
                    self.expr(expr, Role::Rhs, ctx)?;
                }
            }
            Stmt::IncDec { x, .. } => self.expr(x, Role::X, ctx)?,
            Stmt::Return(results) => {
                for expr in results {
                    self.expr(expr, Role::Results, ctx)?;
                }
            }
            Stmt::Block(block) => self.block(block, ctx)?,
            Stmt::If {
                init,
                cond,
                then,
                els,
            } => {
                if let Some(init) = init {
                    self.stmt(init, ctx)?;
                }
                self.expr(cond, Role::Cond, ctx)?;
                self.block(then, ctx)?;
                if let Some(els) = els {
                    self.stmt(els, ctx)?;
                }
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                if let Some(init) = init {
                    self.stmt(init, ctx)?;
                }
                if let Some(cond) = cond {
                    self.expr(cond, Role::Cond, ctx)?;
                }
                if let Some(post) = post {
                    self.stmt(post, ctx)?;
                }
                self.block(body, ctx)?;
            }
            Stmt::Range {
                key,
                value,
                x,
                body,
                ..
            } => {
                for expr in key.iter_mut().chain(value.iter_mut()) {
                    self.expr(expr, Role::Lhs, ctx)?;
                }
                self.expr(x, Role::X, ctx)?;
                self.block(body, ctx)?;
            }
            Stmt::Switch { init, tag, clauses } => {
                if let Some(init) = init {
                    self.stmt(init, ctx)?;
                }
                if let Some(tag) = tag {
                    self.expr(tag, Role::Tag, ctx)?;
                }
                for clause in clauses {
                    for expr in &mut clause.list {
                        self.expr(expr, Role::List, ctx)?;
                    }
                    for stmt in &mut clause.body {
                        self.stmt(stmt, ctx)?;
                    }
                }
            }
            Stmt::Empty => {}
        }
        Ok(())
    }

    /// Rewrites the children of `expr`, then `expr` itself.
    fn expr(&mut self, expr: &mut Expr, role: Role, ctx: &mut FileContext) -> Result<()> {
        if negated_literal(expr).is_some() && role.is_unary_data() {
            let typ = self.oracle.type_of(expr.id).cloned();
            self.negation(expr, role, typ, ctx);
            return Ok(());
        }
        // `-0` folds to +0 as a constant, but negating a computed zero float gives -0
        let negated_zero = negated_literal(expr).is_some_and(is_zero);

        match &mut expr.kind {
            ExprKind::Ident(_)
            | ExprKind::BasicLit(_)
            | ExprKind::Type(_)
            | ExprKind::Ellipsis => {}
            ExprKind::CompositeLit { elts, .. } => {
                for elt in elts {
                    self.expr(elt, Role::Elts, ctx)?;
                }
            }
            ExprKind::KeyValue { key, value } => {
                self.expr(key, Role::Key, ctx)?;
                self.expr(value, Role::Value, ctx)?;
            }
            ExprKind::FuncLit { body, .. } => self.block(body, ctx)?,
            ExprKind::Paren(x) | ExprKind::Star(x) => self.expr(x, Role::X, ctx)?,
            ExprKind::Selector { x, .. } => self.expr(x, Role::X, ctx)?,
            ExprKind::Index { x, index } => {
                self.expr(x, Role::X, ctx)?;
                self.expr(index, Role::Index, ctx)?;
            }
            ExprKind::Slice { x, low, high } => {
                self.expr(x, Role::X, ctx)?;
                for bound in low.iter_mut().chain(high.iter_mut()) {
                    self.expr(bound, Role::Index, ctx)?;
                }
            }
            ExprKind::Call { fun, args } => {
                self.expr(fun, Role::Fun, ctx)?;
                for arg in args {
                    self.expr(arg, Role::Args, ctx)?;
                }
            }
            ExprKind::Unary { .. } if negated_zero => {}
            ExprKind::Unary { x, .. } => self.expr(x, Role::X, ctx)?,
            ExprKind::Binary { x, y, .. } => {
                self.expr(x, Role::X, ctx)?;
                self.expr(y, Role::Y, ctx)?;
            }
        }

        match expr.kind {
            ExprKind::Ident(_) => self.boolean(expr, ctx),
            ExprKind::BasicLit(ref lit) if role.is_data() => {
                let kind = lit.kind;
                match kind {
                    LitKind::Int | LitKind::Float => self.number(expr, ctx),
                    LitKind::String => self.string(expr, ctx)?,
                    LitKind::Imag | LitKind::Char => {}
                }
            }
            ExprKind::CompositeLit { typ: Some(_), .. } => self.byte_sequence(expr, ctx),
            _ => {}
        }
        Ok(())
    }

    fn boolean(&mut self, expr: &mut Expr, ctx: &mut FileContext) {
        let Some(obj) = self.oracle.object_of(expr.id) else {
            return;
        };
        let value = if Some(obj) == self.oracle.universe("true") {
            true
        } else if Some(obj) == self.oracle.universe("false") {
            false
        } else {
            return;
        };
        let NumberReplacement {
            expr: replacement,
            value: original,
            strategy,
            ..
        } = number::obfuscate_bool(value, self.strategies, self.rng);
        debug!("{}: replaced {value}", ctx.file);
        ctx.record(original, "bool".to_string(), strategy, &replacement);
        *expr = replacement;
    }

    fn number(&mut self, expr: &mut Expr, ctx: &mut FileContext) {
        let Some(typ) = self.oracle.type_of(expr.id).cloned() else {
            return;
        };
        let ExprKind::BasicLit(lit) = &expr.kind else {
            return;
        };
        let Some(target) = NumericTarget::resolve(&typ) else {
            return;
        };
        if let Some(out) = number::obfuscate_number(lit, false, &target, self.strategies, self.rng)
        {
            self.apply_number(expr, &typ, out, ctx);
        }
    }

    /// `-lit`, typed as `typ`. Left untouched when the number path declines it.
    fn negation(&mut self, expr: &mut Expr, role: Role, typ: Option<Type>, ctx: &mut FileContext) {
        let Some(lit) = negated_literal(expr) else {
            return;
        };
        let Some(typ) = typ.or_else(|| self.oracle.type_of(expr.id).cloned()) else {
            return;
        };
        let Some(target) = NumericTarget::resolve(&typ) else {
            return;
        };
        debug!("{}: negated literal -{} in {role:?} position", ctx.file, lit.value);
        if let Some(out) = number::obfuscate_number(lit, true, &target, self.strategies, self.rng) {
            self.apply_number(expr, &typ, out, ctx);
        }
    }

    fn apply_number(
        &mut self,
        expr: &mut Expr,
        typ: &Type,
        out: NumberReplacement,
        ctx: &mut FileContext,
    ) {
        ctx.needs_unsafe |= out.needs_unsafe;
        let typ = match typ {
            Type::Basic(kind) => kind.default_kind().to_string(),
            other => other.to_string(),
        };
        ctx.record(out.value, typ, out.strategy, &out.expr);
        *expr = out.expr;
    }

    fn string(&mut self, expr: &mut Expr, ctx: &mut FileContext) -> Result<()> {
        let named = match self.oracle.type_of(expr.id) {
            Some(Type::Basic(BasicKind::String | BasicKind::UntypedString)) => None,
            Some(typ @ Type::Named { local: true, .. }) if typ.underlying() == &Type::string() => {
                Some(typ.to_string())
            }
            _ => return Ok(()),
        };
        let ExprKind::BasicLit(lit) = &expr.kind else {
            return Ok(());
        };
        let data = literal::unquote(&lit.value).map_err(|err| match err {
            litmask_core::Error::MalformedLiteral { text, reason } => Error::MalformedLiteral {
                file: ctx.file.clone(),
                text,
                reason,
            },
            other => Error::Core(other),
        })?;
        if data.is_empty() {
            return Ok(());
        }

        let pool = self.strategies;
        let strategy = pool.pick(self.rng);
        let (mut stmts, decoded) = strategy.obfuscate(&data, self.rng).into_named();
        stmts.push(builder::return_stmt(builder::convert_basic(
            BasicKind::String,
            ident(&decoded),
        )));
        let call = builder::lambda_call(TypeExpr::name("string"), stmts);
        let (replacement, typ) = match named {
            Some(name) => (builder::convert_named(&name, call), name),
            None => (call, "string".to_string()),
        };

        debug!(
            "{}: replaced {}-byte string via {}",
            ctx.file,
            data.len(),
            strategy.name()
        );
        ctx.record(LiteralValue::Str(data), typ, strategy.name(), &replacement);
        *expr = replacement;
        Ok(())
    }

    /// `[N]byte{...}` and `[]byte{...}` with plain integer elements.
    fn byte_sequence(&mut self, expr: &mut Expr, ctx: &mut FileContext) {
        let ExprKind::CompositeLit { elts, .. } = &expr.kind else {
            return;
        };
        if elts.is_empty() {
            return;
        }
        let array_len = match self.oracle.type_of(expr.id) {
            Some(Type::Array { len, elem }) if elem.is_byte() => Some(*len),
            Some(Type::Slice(elem)) if elem.is_byte() => None,
            _ => return,
        };

        let mut data = Vec::with_capacity(elts.len());
        for elt in elts {
            let Some(byte) = byte_value(elt) else {
                return;
            };
            data.push(byte);
        }
        if let Some(len) = array_len {
            let Ok(len) = usize::try_from(len) else {
                return;
            };
            if data.len() > len {
                return;
            }
            data.resize(len, 0);
        }

        let pool = self.strategies;
        let strategy = pool.pick(self.rng);
        let (mut stmts, decoded) = strategy.obfuscate(&data, self.rng).into_named();
        let (replacement, original, typ) = match array_len {
            Some(len) => {
                stmts.push(builder::var_decl("newdata", builder::byte_array_type(len)));
                stmts.push(builder::range_loop(
                    "i",
                    ident("newdata"),
                    vec![builder::assign(
                        index(ident("newdata"), ident("i")),
                        index(ident(&decoded), ident("i")),
                    )],
                ));
                stmts.push(builder::return_stmt(ident("newdata")));
                (
                    builder::lambda_call(builder::byte_array_type(len), stmts),
                    LiteralValue::Array(data),
                    format!("[{len}]byte"),
                )
            }
            None => {
                stmts.push(builder::return_stmt(ident(&decoded)));
                (
                    builder::lambda_call(builder::byte_slice_type(), stmts),
                    LiteralValue::Bytes(data),
                    "[]byte".to_string(),
                )
            }
        };

        debug!("{}: replaced {typ} literal via {}", ctx.file, strategy.name());
        ctx.record(original, typ, strategy.name(), &replacement);
        *expr = replacement;
    }

    fn object_type(&self, id: NodeId) -> Option<Type> {
        let obj = self.oracle.object_of(id)?;
        self.oracle.object(obj).map(|object| object.typ.clone())
    }
}

/// The literal under `-lit` when it is an integer or float.
fn negated_literal(expr: &Expr) -> Option<&litmask_core::ast::BasicLit> {
    let ExprKind::Unary {
        op: UnaryOp::Neg,
        x,
    } = &expr.kind
    else {
        return None;
    };
    x.as_basic_lit()
        .filter(|lit| matches!(lit.kind, LitKind::Int | LitKind::Float))
}

fn is_zero(lit: &litmask_core::ast::BasicLit) -> bool {
    match lit.kind {
        LitKind::Int => literal::parse_int(&lit.value) == Some(0),
        LitKind::Float => literal::parse_float(&lit.value) == Some(0.0),
        _ => false,
    }
}

/// An element of a byte sequence literal: a plain integer literal no larger than a byte.
fn byte_value(elt: &Expr) -> Option<u8> {
    let lit = elt.as_basic_lit()?;
    if lit.kind != LitKind::Int {
        return None;
    }
    u8::try_from(literal::parse_int(&lit.value)?).ok()
}

fn mentions_iota(expr: &Expr) -> bool {
    struct Finder(bool);
    impl Visitor for Finder {
        fn visit_ident(&mut self, _id: NodeId, name: &str) {
            self.0 |= name == "iota";
        }
    }
    let mut finder = Finder(false);
    visit::walk_expr(&mut finder, expr);
    finder.0
}
