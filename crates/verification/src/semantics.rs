//! Reference evaluator for the Go subset that literal replacements are built from.
//!
//! The evaluator walks the replacement tree directly. It understands exactly what the
//! rewriter and the built-in strategies emit: immediately invoked function literals, short
//! variable declarations, `var` declarations with zero values, index and tuple assignment,
//! `for` and `for range` loops, the `len`, `append` and `copy` builtins, basic and named
//! conversions, and the `unsafe.Pointer` reinterpretation used for floats. Anything else is
//! reported as [`Error::Unsupported`].

use crate::value::Value;
use crate::{Error, Result};
use litmask_core::ast::{
    AssignToken, BinaryOp, Block, Expr, ExprKind, FuncSig, GenDecl, LitKind, Spec, Stmt,
    TypeExpr, UnaryOp,
};
use litmask_core::literal;
use litmask_core::types::BasicKind;
use std::collections::HashMap;

/// Statements executed before evaluation is abandoned.
pub const DEFAULT_STEP_LIMIT: usize = 1 << 20;

/// Outcome of executing a statement.
#[derive(Debug)]
enum Flow {
    Normal,
    Return(Value),
}

/// Place an assignment stores into, resolved before any store happens.
#[derive(Debug)]
enum Target {
    Blank,
    Var(String),
    Element(String, u64),
}

#[derive(Debug)]
pub struct Evaluator {
    scopes: Vec<HashMap<String, Value>>,
    steps: usize,
    step_limit: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_step_limit(DEFAULT_STEP_LIMIT)
    }

    pub fn with_step_limit(step_limit: usize) -> Self {
        Self {
            scopes: vec![HashMap::new()],
            steps: 0,
            step_limit,
        }
    }

    /// Statements executed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Evaluates `expr` to a value.
    pub fn eval(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Ident(name) => match name.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => self.lookup(name).cloned(),
            },
            ExprKind::BasicLit(lit) => match lit.kind {
                LitKind::Int => literal::parse_int(&lit.value)
                    .map(|v| Value::int(v, BasicKind::UntypedInt))
                    .ok_or_else(|| Error::Type(format!("bad integer literal {}", lit.value))),
                LitKind::Float => literal::parse_float(&lit.value)
                    .map(|value| Value::Float {
                        value,
                        kind: BasicKind::UntypedFloat,
                    })
                    .ok_or_else(|| Error::Type(format!("bad float literal {}", lit.value))),
                LitKind::String => literal::unquote(&lit.value)
                    .map(Value::Str)
                    .map_err(|e| Error::Type(e.to_string())),
                LitKind::Char | LitKind::Imag => {
                    Err(Error::Unsupported(format!("literal {}", lit.value)))
                }
            },
            ExprKind::CompositeLit { typ: Some(typ), elts } => self.composite(typ, elts),
            ExprKind::Paren(inner) => self.eval(inner),
            ExprKind::Index { x, index } => {
                let container = self.eval(x)?;
                let idx = self.eval(index)?.as_index()?;
                element(&container, idx)
            }
            ExprKind::Call { fun, args } => self.call(fun, args),
            ExprKind::Star(inner) => match self.eval(inner)? {
                Value::Pointer { target, view } => reinterpret(*target, view),
                other => Err(Error::Type(format!("cannot dereference {other}"))),
            },
            ExprKind::Unary {
                op: UnaryOp::Addr,
                x,
            } => Ok(Value::Pointer {
                target: Box::new(self.eval(x)?),
                view: None,
            }),
            ExprKind::Unary { op, x } => {
                let x = self.eval(x)?;
                Value::unary(*op, &x)
            }
            ExprKind::Binary { op, x, y } => {
                let x = self.eval(x)?;
                let y = self.eval(y)?;
                Value::binary(*op, &x, &y)
            }
            other => Err(Error::Unsupported(format!("expression {other:?}"))),
        }
    }

    fn lookup(&self, name: &str) -> Result<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| Error::UndefinedVariable(name.to_string()))
    }

    fn lookup_mut(&mut self, name: &str) -> Result<&mut Value> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
            .ok_or_else(|| Error::UndefinedVariable(name.to_string()))
    }

    fn define(&mut self, name: &str, value: Value) {
        if name == "_" {
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    fn composite(&mut self, typ: &TypeExpr, elts: &[Expr]) -> Result<Value> {
        let TypeExpr::Array { len, elem } = typ else {
            return Err(Error::Unsupported(format!("composite literal of {typ:?}")));
        };
        if basic_kind(elem) == Some(BasicKind::Uint8) {
            let mut data = elts
                .iter()
                .map(|e| self.eval(e)?.as_byte())
                .collect::<Result<Vec<u8>>>()?;
            return match len {
                None => Ok(Value::Bytes(data)),
                Some(len) => {
                    let len = self.eval(len)?.as_index()? as usize;
                    if data.len() > len {
                        return Err(Error::IndexOutOfRange {
                            index: data.len() as u64,
                            len,
                        });
                    }
                    data.resize(len, 0);
                    Ok(Value::Array(data))
                }
            };
        }
        if len.is_some() {
            return Err(Error::Unsupported(format!("array literal of {elem:?}")));
        }
        let items = elts
            .iter()
            .map(|e| match &e.kind {
                ExprKind::CompositeLit { typ: None, elts } => self.composite(elem, elts),
                _ => {
                    let value = self.eval(e)?;
                    match basic_kind(elem) {
                        Some(kind) => value.convert(kind),
                        None => Ok(value),
                    }
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::List(items))
    }

    fn call(&mut self, fun: &Expr, args: &[Expr]) -> Result<Value> {
        match &fun.kind {
            ExprKind::FuncLit { sig, body } if args.is_empty() => self.invoke(sig, body),
            ExprKind::Paren(inner) => self.call(inner, args),
            ExprKind::Ident(name) => match name.as_str() {
                "len" => {
                    let x = self.single_arg(name, args)?;
                    let len = match x.unnamed() {
                        Value::Bytes(data) | Value::Array(data) | Value::Str(data) => data.len(),
                        Value::List(items) => items.len(),
                        other => return Err(Error::Type(format!("len of {other}"))),
                    };
                    Ok(Value::int(len as u64, BasicKind::Int))
                }
                "append" => self.append(args),
                "copy" => self.copy(args),
                _ => {
                    let x = self.single_arg(name, args)?;
                    match BasicKind::from_name(name) {
                        Some(kind) => x.convert(kind),
                        None => Ok(Value::Named {
                            name: name.clone(),
                            value: Box::new(x),
                        }),
                    }
                }
            },
            ExprKind::Selector { x, sel }
                if x.as_ident() == Some("unsafe") && sel.name == "Pointer" =>
            {
                match self.single_arg("unsafe.Pointer", args)? {
                    pointer @ Value::Pointer { .. } => Ok(pointer),
                    other => Err(Error::Type(format!("unsafe.Pointer of {other}"))),
                }
            }
            ExprKind::Type(TypeExpr::Pointer(elem)) => {
                let view = basic_kind(elem)
                    .ok_or_else(|| Error::Unsupported(format!("pointer to {elem:?}")))?;
                match self.single_arg("pointer conversion", args)? {
                    Value::Pointer { target, .. } => Ok(Value::Pointer {
                        target,
                        view: Some(view),
                    }),
                    other => Err(Error::Type(format!("cannot convert {other} to *{view}"))),
                }
            }
            other => Err(Error::Unsupported(format!("call of {other:?}"))),
        }
    }

    fn single_arg(&mut self, callee: &str, args: &[Expr]) -> Result<Value> {
        match args {
            [arg] => self.eval(arg),
            _ => Err(Error::Type(format!(
                "{callee} expects one argument, got {}",
                args.len()
            ))),
        }
    }

    fn append(&mut self, args: &[Expr]) -> Result<Value> {
        let Some((first, rest)) = args.split_first() else {
            return Err(Error::Type("append without arguments".into()));
        };
        match self.eval(first)? {
            Value::Bytes(mut data) => {
                for arg in rest {
                    data.push(self.eval(arg)?.as_byte()?);
                }
                Ok(Value::Bytes(data))
            }
            Value::List(mut items) => {
                for arg in rest {
                    items.push(self.eval(arg)?);
                }
                Ok(Value::List(items))
            }
            other => Err(Error::Type(format!("append to {other}"))),
        }
    }

    /// `copy(dst, src)` where `dst` names a byte slice or array variable.
    fn copy(&mut self, args: &[Expr]) -> Result<Value> {
        let [dst, src] = args else {
            return Err(Error::Type("copy expects two arguments".into()));
        };
        let name = dst
            .as_ident()
            .ok_or_else(|| Error::Unsupported("copy into a non-variable".into()))?;
        let src = match self.eval(src)? {
            Value::Bytes(data) | Value::Array(data) | Value::Str(data) => data,
            other => return Err(Error::Type(format!("copy from {other}"))),
        };
        match self.lookup_mut(name)? {
            Value::Bytes(data) | Value::Array(data) => {
                let n = data.len().min(src.len());
                data[..n].copy_from_slice(&src[..n]);
                Ok(Value::int(n as u64, BasicKind::Int))
            }
            other => Err(Error::Type(format!("copy into {other}"))),
        }
    }

    fn invoke(&mut self, sig: &FuncSig, body: &Block) -> Result<Value> {
        let result = match sig.results.as_slice() {
            [field] if sig.params.is_empty() => &field.typ,
            _ => return Err(Error::Unsupported("function literal signature".into())),
        };
        self.scopes.push(HashMap::new());
        let flow = self.exec_stmts(&body.stmts);
        self.scopes.pop();
        match flow? {
            Flow::Return(value) => match basic_kind(result) {
                Some(kind) if is_untyped(&value) => value.convert(kind),
                _ => Ok(value),
            },
            Flow::Normal => Err(Error::MissingReturn),
        }
    }

    fn exec_stmts(&mut self, stmts: &[Stmt]) -> Result<Flow> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn scoped(&mut self, stmts: &[Stmt]) -> Result<Flow> {
        self.scopes.push(HashMap::new());
        let flow = self.exec_stmts(stmts);
        self.scopes.pop();
        flow
    }

    fn tick(&mut self) -> Result<()> {
        self.steps += 1;
        if self.steps > self.step_limit {
            return Err(Error::StepLimit(self.step_limit));
        }
        Ok(())
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<Flow> {
        self.tick()?;
        match stmt {
            Stmt::Decl(decl) => self.declare(decl).map(|_| Flow::Normal),
            Stmt::Expr(expr) => self.eval(expr).map(|_| Flow::Normal),
            Stmt::Assign { lhs, tok, rhs } => self.assign(lhs, *tok, rhs).map(|_| Flow::Normal),
            Stmt::IncDec { x, inc } => {
                let op = if *inc { BinaryOp::Add } else { BinaryOp::Sub };
                let one = Value::int(1, BasicKind::UntypedInt);
                self.update(x, op, one).map(|_| Flow::Normal)
            }
            Stmt::Return(results) => match results.as_slice() {
                [value] => Ok(Flow::Return(self.eval(value)?)),
                _ => Err(Error::Unsupported(format!(
                    "return of {} values",
                    results.len()
                ))),
            },
            Stmt::Block(block) => self.scoped(&block.stmts),
            Stmt::If {
                init,
                cond,
                then,
                els,
            } => {
                self.scopes.push(HashMap::new());
                let flow = self.exec_if(init.as_deref(), cond, then, els.as_deref());
                self.scopes.pop();
                flow
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                self.scopes.push(HashMap::new());
                let flow = self.exec_for(init.as_deref(), cond.as_ref(), post.as_deref(), body);
                self.scopes.pop();
                flow
            }
            Stmt::Range {
                key,
                value,
                define,
                x,
                body,
            } => self.exec_range(key.as_ref(), value.as_ref(), *define, x, body),
            Stmt::Empty => Ok(Flow::Normal),
            Stmt::Switch { .. } => Err(Error::Unsupported("switch statement".into())),
        }
    }

    fn exec_if(
        &mut self,
        init: Option<&Stmt>,
        cond: &Expr,
        then: &Block,
        els: Option<&Stmt>,
    ) -> Result<Flow> {
        if let Some(init) = init {
            self.exec(init)?;
        }
        if self.eval(cond)?.as_bool()? {
            self.scoped(&then.stmts)
        } else if let Some(els) = els {
            self.exec(els)
        } else {
            Ok(Flow::Normal)
        }
    }

    fn exec_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        post: Option<&Stmt>,
        body: &Block,
    ) -> Result<Flow> {
        if let Some(init) = init {
            self.exec(init)?;
        }
        loop {
            if let Some(cond) = cond {
                if !self.eval(cond)?.as_bool()? {
                    return Ok(Flow::Normal);
                }
            }
            if let Flow::Return(value) = self.scoped(&body.stmts)? {
                return Ok(Flow::Return(value));
            }
            match post {
                Some(post) => {
                    self.exec(post)?;
                }
                None => self.tick()?,
            }
        }
    }

    fn exec_range(
        &mut self,
        key: Option<&Expr>,
        value: Option<&Expr>,
        define: bool,
        x: &Expr,
        body: &Block,
    ) -> Result<Flow> {
        let items: Vec<Value> = match self.eval(x)?.unnamed() {
            Value::Bytes(data) | Value::Array(data) => {
                data.iter().copied().map(Value::byte).collect()
            }
            Value::List(items) => items.clone(),
            other => return Err(Error::Unsupported(format!("range over {other}"))),
        };

        for (idx, item) in items.into_iter().enumerate() {
            self.tick()?;
            self.scopes.push(HashMap::new());
            let flow = self.range_iteration(key, value, define, idx, item, body);
            self.scopes.pop();
            if let Flow::Return(value) = flow? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn range_iteration(
        &mut self,
        key: Option<&Expr>,
        value: Option<&Expr>,
        define: bool,
        idx: usize,
        item: Value,
        body: &Block,
    ) -> Result<Flow> {
        let idx = Value::int(idx as u64, BasicKind::Int);
        for (target, bound) in [(key, idx), (value, item)] {
            let Some(target) = target else { continue };
            if define {
                let name = target
                    .as_ident()
                    .ok_or_else(|| Error::Type("range variable is not an identifier".into()))?;
                self.define(name, bound);
            } else {
                let target = self.target(target)?;
                self.store(target, bound)?;
            }
        }
        self.exec_stmts(&body.stmts)
    }

    fn declare(&mut self, decl: &GenDecl) -> Result<()> {
        for spec in &decl.specs {
            let Spec::Value(spec) = spec else { continue };
            if spec.values.is_empty() {
                let typ = spec
                    .typ
                    .as_ref()
                    .ok_or_else(|| Error::Type("declaration without type or value".into()))?;
                for name in &spec.names {
                    let zero = zero_value(typ)?;
                    self.define(&name.name, zero);
                }
                continue;
            }
            if spec.values.len() != spec.names.len() {
                return Err(Error::Unsupported("multi-value declaration".into()));
            }
            let values = spec
                .values
                .iter()
                .map(|v| self.eval(v))
                .collect::<Result<Vec<_>>>()?;
            for (name, value) in spec.names.iter().zip(values) {
                let value = match spec.typ.as_ref().and_then(basic_kind) {
                    Some(kind) => value.convert(kind)?,
                    None => default_typed(value)?,
                };
                self.define(&name.name, value);
            }
        }
        Ok(())
    }

    fn assign(&mut self, lhs: &[Expr], tok: AssignToken, rhs: &[Expr]) -> Result<()> {
        if let AssignToken::Op(op) = tok {
            let [target] = lhs else {
                return Err(Error::Type("compound assignment to several operands".into()));
            };
            let [value] = rhs else {
                return Err(Error::Type("compound assignment of several values".into()));
            };
            let value = self.eval(value)?;
            return self.update(target, op, value);
        }

        if lhs.len() != rhs.len() {
            return Err(Error::Unsupported("multi-value assignment".into()));
        }
        let values = rhs
            .iter()
            .map(|v| self.eval(v))
            .collect::<Result<Vec<_>>>()?;

        if tok == AssignToken::Define {
            for (target, value) in lhs.iter().zip(values) {
                let name = target
                    .as_ident()
                    .ok_or_else(|| Error::Type("cannot define a non-identifier".into()))?;
                let value = default_typed(value)?;
                self.define(name, value);
            }
            return Ok(());
        }

        let targets = lhs
            .iter()
            .map(|t| self.target(t))
            .collect::<Result<Vec<_>>>()?;
        for (target, value) in targets.into_iter().zip(values) {
            self.store(target, value)?;
        }
        Ok(())
    }

    /// `target op= value`
    fn update(&mut self, target: &Expr, op: BinaryOp, value: Value) -> Result<()> {
        let current = self.eval(target)?;
        let next = Value::binary(op, &current, &value)?;
        let target = self.target(target)?;
        self.store(target, next)
    }

    fn target(&mut self, expr: &Expr) -> Result<Target> {
        match &expr.kind {
            ExprKind::Ident(name) if name == "_" => Ok(Target::Blank),
            ExprKind::Ident(name) => Ok(Target::Var(name.clone())),
            ExprKind::Index { x, index } => {
                let name = x
                    .as_ident()
                    .ok_or_else(|| Error::Unsupported("assignment through nested index".into()))?
                    .to_string();
                let idx = self.eval(index)?.as_index()?;
                Ok(Target::Element(name, idx))
            }
            ExprKind::Paren(inner) => self.target(inner),
            other => Err(Error::Unsupported(format!("assignment to {other:?}"))),
        }
    }

    fn store(&mut self, target: Target, value: Value) -> Result<()> {
        match target {
            Target::Blank => Ok(()),
            Target::Var(name) => {
                let slot = self.lookup_mut(&name)?;
                let declared = match &*slot {
                    Value::Int { kind, .. } | Value::Float { kind, .. } => Some(*kind),
                    _ => None,
                };
                let value = match declared {
                    Some(kind) if is_untyped(&value) => value.convert(kind)?,
                    _ => value,
                };
                *slot = value;
                Ok(())
            }
            Target::Element(name, idx) => match self.lookup_mut(&name)? {
                Value::Bytes(data) | Value::Array(data) => {
                    let len = data.len();
                    let slot = data
                        .get_mut(idx as usize)
                        .ok_or(Error::IndexOutOfRange { index: idx, len })?;
                    *slot = value.as_byte()?;
                    Ok(())
                }
                Value::List(items) => {
                    let len = items.len();
                    let slot = items
                        .get_mut(idx as usize)
                        .ok_or(Error::IndexOutOfRange { index: idx, len })?;
                    *slot = value;
                    Ok(())
                }
                other => Err(Error::Type(format!("cannot index {other}"))),
            },
        }
    }
}

fn basic_kind(typ: &TypeExpr) -> Option<BasicKind> {
    match typ {
        TypeExpr::Name(name) => BasicKind::from_name(name),
        _ => None,
    }
}

fn is_untyped(value: &Value) -> bool {
    matches!(
        value,
        Value::Int { kind, .. } | Value::Float { kind, .. } if kind.is_untyped()
    )
}

/// Gives an untyped constant its default type, as `:=` does.
fn default_typed(value: Value) -> Result<Value> {
    match &value {
        Value::Int { kind, .. } | Value::Float { kind, .. } if kind.is_untyped() => {
            value.convert(kind.default_kind())
        }
        _ => Ok(value),
    }
}

fn zero_value(typ: &TypeExpr) -> Result<Value> {
    if let Some(kind) = basic_kind(typ) {
        return Ok(match kind {
            BasicKind::Bool => Value::Bool(false),
            BasicKind::String => Value::Str(Vec::new()),
            kind if kind.is_float() => Value::Float { value: 0.0, kind },
            kind if kind.is_integer() => Value::int(0, kind),
            kind => return Err(Error::Unsupported(format!("zero value of {kind}"))),
        });
    }
    match typ {
        TypeExpr::Array { len: None, elem } if basic_kind(elem) == Some(BasicKind::Uint8) => {
            Ok(Value::Bytes(Vec::new()))
        }
        TypeExpr::Array { len: None, .. } => Ok(Value::List(Vec::new())),
        TypeExpr::Array {
            len: Some(len),
            elem,
        } if basic_kind(elem) == Some(BasicKind::Uint8) => {
            let len = match len.as_basic_lit().and_then(|lit| literal::parse_int(&lit.value)) {
                Some(len) => len as usize,
                None => return Err(Error::Unsupported("array length expression".into())),
            };
            Ok(Value::Array(vec![0; len]))
        }
        other => Err(Error::Unsupported(format!("zero value of {other:?}"))),
    }
}

fn element(container: &Value, idx: u64) -> Result<Value> {
    let out_of_range = |len: usize| Error::IndexOutOfRange { index: idx, len };
    match container.unnamed() {
        Value::Bytes(data) | Value::Array(data) | Value::Str(data) => data
            .get(idx as usize)
            .map(|&b| Value::byte(b))
            .ok_or_else(|| out_of_range(data.len())),
        Value::List(items) => items
            .get(idx as usize)
            .cloned()
            .ok_or_else(|| out_of_range(items.len())),
        other => Err(Error::Type(format!("cannot index {other}"))),
    }
}

/// Reads the pointee of `target` as `view`.
fn reinterpret(target: Value, view: Option<BasicKind>) -> Result<Value> {
    let Some(view) = view else {
        return Ok(target);
    };
    let bits = match &target {
        Value::Int { bits, .. } => *bits,
        Value::Float { value, kind: BasicKind::Float32 } => u64::from((*value as f32).to_bits()),
        Value::Float { value, .. } => value.to_bits(),
        other => return Err(Error::Unsupported(format!("reinterpreting {other}"))),
    };
    match view {
        BasicKind::Float64 => Ok(Value::Float {
            value: f64::from_bits(bits),
            kind: view,
        }),
        BasicKind::Float32 => Ok(Value::Float {
            value: f64::from(f32::from_bits(bits as u32)),
            kind: view,
        }),
        kind if kind.is_integer() => Ok(Value::int(bits, kind)),
        kind => Err(Error::Unsupported(format!("reinterpreting as {kind}"))),
    }
}
