//! Renders syntax trees back to Go source.
//!
//! Output follows gofmt conventions closely enough to be diffed and compiled; it makes no
//! attempt at alignment of comments or struct fields.

use crate::ast::*;
use std::fmt::Write;

/// Renders a whole file.
pub fn print_file(file: &File) -> String {
    let mut p = Printer::default();
    p.file(file);
    p.out
}

/// Renders a single expression on one line.
pub fn print_expr(expr: &Expr) -> String {
    let mut p = Printer::default();
    p.expr(expr);
    p.out
}

/// Renders a type expression.
pub fn print_type(typ: &TypeExpr) -> String {
    let mut p = Printer::default();
    p.typ(typ);
    p.out
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn file(&mut self, file: &File) {
        let _ = write!(self.out, "package {}", file.package);
        self.out.push('\n');

        match file.imports.as_slice() {
            [] => {}
            [single] => {
                self.out.push_str("\nimport ");
                self.import(single);
                self.out.push('\n');
            }
            many => {
                self.out.push_str("\nimport (");
                self.indent += 1;
                for spec in many {
                    self.newline();
                    self.import(spec);
                }
                self.indent -= 1;
                self.out.push_str("\n)\n");
            }
        }

        for decl in &file.decls {
            self.out.push('\n');
            match decl {
                Decl::Gen(gen_decl) => self.gen_decl(gen_decl),
                Decl::Func(func) => self.func_decl(func),
            }
            self.out.push('\n');
        }
    }

    fn import(&mut self, spec: &ImportSpec) {
        if let Some(name) = &spec.name {
            self.out.push_str(name);
            self.out.push(' ');
        }
        let _ = write!(self.out, "\"{}\"", spec.path);
    }

    fn gen_decl(&mut self, decl: &GenDecl) {
        self.out.push_str(decl.tok.as_str());
        self.out.push(' ');
        match decl.specs.as_slice() {
            [single] => self.spec(single),
            specs => {
                self.out.push('(');
                self.indent += 1;
                for spec in specs {
                    self.newline();
                    self.spec(spec);
                }
                self.indent -= 1;
                self.newline();
                self.out.push(')');
            }
        }
    }

    fn spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Value(spec) => {
                self.ident_list(&spec.names);
                if let Some(typ) = &spec.typ {
                    self.out.push(' ');
                    self.typ(typ);
                }
                if !spec.values.is_empty() {
                    self.out.push_str(" = ");
                    self.expr_list(&spec.values);
                }
            }
            Spec::Type(spec) => {
                self.out.push_str(&spec.name.name);
                self.out.push_str(if spec.alias { " = " } else { " " });
                self.typ(&spec.typ);
            }
        }
    }

    fn func_decl(&mut self, func: &FuncDecl) {
        self.out.push_str("func ");
        if let Some(recv) = &func.recv {
            self.out.push('(');
            self.field(recv);
            self.out.push_str(") ");
        }
        self.out.push_str(&func.name.name);
        self.sig(&func.sig);
        if let Some(body) = &func.body {
            self.out.push(' ');
            self.block(body);
        }
    }

    fn sig(&mut self, sig: &FuncSig) {
        self.out.push('(');
        self.fields(&sig.params, ", ");
        self.out.push(')');
        match sig.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                self.out.push(' ');
                self.typ(&single.typ);
            }
            results => {
                self.out.push_str(" (");
                self.fields(results, ", ");
                self.out.push(')');
            }
        }
    }

    fn fields(&mut self, fields: &[Field], sep: &str) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.out.push_str(sep);
            }
            self.field(field);
        }
    }

    fn field(&mut self, field: &Field) {
        if !field.names.is_empty() {
            self.ident_list(&field.names);
            self.out.push(' ');
        }
        self.typ(&field.typ);
        if let Some(tag) = &field.tag {
            self.out.push(' ');
            self.out.push_str(&tag.value);
        }
    }

    fn ident_list(&mut self, names: &[Ident]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&name.name);
        }
    }

    fn block(&mut self, block: &Block) {
        self.stmt_block(&block.stmts);
    }

    fn stmt_block(&mut self, stmts: &[Stmt]) {
        self.out.push('{');
        self.indent += 1;
        for stmt in stmts {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(decl) => self.gen_decl(decl),
            Stmt::Expr(expr) => self.expr(expr),
            Stmt::Assign { lhs, tok, rhs } => {
                self.expr_list(lhs);
                match tok {
                    AssignToken::Assign => self.out.push_str(" = "),
                    AssignToken::Define => self.out.push_str(" := "),
                    AssignToken::Op(op) => {
                        let _ = write!(self.out, " {op}= ");
                    }
                }
                self.expr_list(rhs);
            }
            Stmt::IncDec { x, inc } => {
                self.expr(x);
                self.out.push_str(if *inc { "++" } else { "--" });
            }
            Stmt::Return(results) => {
                self.out.push_str("return");
                if !results.is_empty() {
                    self.out.push(' ');
                    self.expr_list(results);
                }
            }
            Stmt::Block(block) => self.block(block),
            Stmt::If {
                init,
                cond,
                then,
                els,
            } => {
                self.out.push_str("if ");
                if let Some(init) = init {
                    self.stmt(init);
                    self.out.push_str("; ");
                }
                self.expr(cond);
                self.out.push(' ');
                self.block(then);
                if let Some(els) = els {
                    self.out.push_str(" else ");
                    self.stmt(els);
                }
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                self.out.push_str("for ");
                if init.is_some() || post.is_some() {
                    if let Some(init) = init {
                        self.stmt(init);
                    }
                    self.out.push_str("; ");
                    if let Some(cond) = cond {
                        self.expr(cond);
                    }
                    self.out.push_str("; ");
                    if let Some(post) = post {
                        self.stmt(post);
                    }
                    self.out.push(' ');
                } else if let Some(cond) = cond {
                    self.expr(cond);
                    self.out.push(' ');
                }
                self.block(body);
            }
            Stmt::Range {
                key,
                value,
                define,
                x,
                body,
            } => {
                self.out.push_str("for ");
                if let Some(key) = key {
                    self.expr(key);
                    if let Some(value) = value {
                        self.out.push_str(", ");
                        self.expr(value);
                    }
                    self.out.push_str(if *define { " := " } else { " = " });
                }
                self.out.push_str("range ");
                self.expr(x);
                self.out.push(' ');
                self.block(body);
            }
            Stmt::Switch { init, tag, clauses } => {
                self.out.push_str("switch ");
                if let Some(init) = init {
                    self.stmt(init);
                    self.out.push_str("; ");
                }
                if let Some(tag) = tag {
                    self.expr(tag);
                    self.out.push(' ');
                }
                self.out.push('{');
                for clause in clauses {
                    self.newline();
                    if clause.list.is_empty() {
                        self.out.push_str("default:");
                    } else {
                        self.out.push_str("case ");
                        self.expr_list(&clause.list);
                        self.out.push(':');
                    }
                    self.indent += 1;
                    for stmt in &clause.body {
                        self.newline();
                        self.stmt(stmt);
                    }
                    self.indent -= 1;
                }
                self.newline();
                self.out.push('}');
            }
            Stmt::Empty => {}
        }
    }

    fn expr_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(expr);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Ident(name) => self.out.push_str(name),
            ExprKind::BasicLit(lit) => self.out.push_str(&lit.value),
            ExprKind::CompositeLit { typ, elts } => {
                if let Some(typ) = typ {
                    self.typ(typ);
                }
                self.out.push('{');
                self.expr_list(elts);
                self.out.push('}');
            }
            ExprKind::KeyValue { key, value } => {
                self.expr(key);
                self.out.push_str(": ");
                self.expr(value);
            }
            ExprKind::FuncLit { sig, body } => {
                self.out.push_str("func");
                self.sig(sig);
                self.out.push(' ');
                self.block(body);
            }
            ExprKind::Paren(inner) => {
                self.out.push('(');
                self.expr(inner);
                self.out.push(')');
            }
            ExprKind::Selector { x, sel } => {
                self.operand(x);
                self.out.push('.');
                self.out.push_str(&sel.name);
            }
            ExprKind::Index { x, index } => {
                self.operand(x);
                self.out.push('[');
                self.expr(index);
                self.out.push(']');
            }
            ExprKind::Slice { x, low, high } => {
                self.operand(x);
                self.out.push('[');
                if let Some(low) = low {
                    self.expr(low);
                }
                self.out.push(':');
                if let Some(high) = high {
                    self.expr(high);
                }
                self.out.push(']');
            }
            ExprKind::Call { fun, args } => {
                self.operand(fun);
                self.out.push('(');
                self.expr_list(args);
                self.out.push(')');
            }
            ExprKind::Star(inner) => {
                self.out.push('*');
                self.operand(inner);
            }
            ExprKind::Unary { op, x } => {
                self.out.push_str(op.as_str());
                self.operand(x);
            }
            ExprKind::Binary { op, x, y } => {
                self.binary_side(x, op.precedence(), false);
                let _ = write!(self.out, " {op} ");
                self.binary_side(y, op.precedence(), true);
            }
            ExprKind::Type(typ) => self.typ(typ),
            ExprKind::Ellipsis => self.out.push_str("..."),
        }
    }

    /// Prints a primary-position operand, parenthesizing anything that would bind looser.
    fn operand(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Binary { .. } | ExprKind::Unary { .. } | ExprKind::Star(_) => {
                self.out.push('(');
                self.expr(expr);
                self.out.push(')');
            }
            _ => self.expr(expr),
        }
    }

    fn binary_side(&mut self, expr: &Expr, parent: u8, right: bool) {
        let needs_parens = match &expr.kind {
            ExprKind::Binary { op, .. } => {
                let prec = op.precedence();
                prec < parent || (right && prec == parent)
            }
            _ => false,
        };
        if needs_parens {
            self.out.push('(');
            self.expr(expr);
            self.out.push(')');
        } else {
            self.expr(expr);
        }
    }

    fn typ(&mut self, typ: &TypeExpr) {
        match typ {
            TypeExpr::Name(name) => self.out.push_str(name),
            TypeExpr::Qualified { package, name } => {
                let _ = write!(self.out, "{package}.{name}");
            }
            TypeExpr::Array { len, elem } => {
                self.out.push('[');
                if let Some(len) = len {
                    self.expr(len);
                }
                self.out.push(']');
                self.typ(elem);
            }
            TypeExpr::Pointer(elem) => {
                self.out.push('*');
                self.typ(elem);
            }
            TypeExpr::Map { key, value } => {
                self.out.push_str("map[");
                self.typ(key);
                self.out.push(']');
                self.typ(value);
            }
            TypeExpr::Func(sig) => {
                self.out.push_str("func");
                self.sig(sig);
            }
            TypeExpr::Struct(fields) => {
                self.out.push_str("struct {");
                self.indent += 1;
                for field in fields {
                    self.newline();
                    self.field(field);
                }
                self.indent -= 1;
                self.newline();
                self.out.push('}');
            }
            TypeExpr::Interface => self.out.push_str("interface{}"),
        }
    }
}
