//! Read-only traversal over the syntax tree.
//!
//! Implementors override the hooks they care about and call the matching `walk_*`
//! function to keep descending.

use crate::ast::*;

pub trait Visitor {
    fn visit_file(&mut self, file: &File) {
        walk_file(self, file);
    }

    fn visit_decl(&mut self, decl: &Decl) {
        walk_decl(self, decl);
    }

    fn visit_gen_decl(&mut self, decl: &GenDecl) {
        walk_gen_decl(self, decl);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_type(&mut self, typ: &TypeExpr) {
        walk_type(self, typ);
    }

    fn visit_ident(&mut self, _id: NodeId, _name: &str) {}
}

pub fn walk_file<V: Visitor + ?Sized>(v: &mut V, file: &File) {
    for decl in &file.decls {
        v.visit_decl(decl);
    }
}

pub fn walk_decl<V: Visitor + ?Sized>(v: &mut V, decl: &Decl) {
    match decl {
        Decl::Gen(gen_decl) => v.visit_gen_decl(gen_decl),
        Decl::Func(func) => {
            if let Some(recv) = &func.recv {
                walk_field(v, recv);
            }
            v.visit_ident(func.name.id, &func.name.name);
            walk_sig(v, &func.sig);
            if let Some(body) = &func.body {
                walk_block(v, body);
            }
        }
    }
}

pub fn walk_gen_decl<V: Visitor + ?Sized>(v: &mut V, decl: &GenDecl) {
    for spec in &decl.specs {
        match spec {
            Spec::Value(spec) => {
                for name in &spec.names {
                    v.visit_ident(name.id, &name.name);
                }
                if let Some(typ) = &spec.typ {
                    v.visit_type(typ);
                }
                for value in &spec.values {
                    v.visit_expr(value);
                }
            }
            Spec::Type(spec) => {
                v.visit_ident(spec.name.id, &spec.name.name);
                v.visit_type(&spec.typ);
            }
        }
    }
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Decl(decl) => v.visit_gen_decl(decl),
        Stmt::Expr(expr) => v.visit_expr(expr),
        Stmt::Assign { lhs, rhs, .. } => {
            for expr in lhs.iter().chain(rhs) {
                v.visit_expr(expr);
            }
        }
        Stmt::IncDec { x, .. } => v.visit_expr(x),
        Stmt::Return(results) => {
            for expr in results {
                v.visit_expr(expr);
            }
        }
        Stmt::Block(block) => walk_block(v, block),
        Stmt::If {
            init,
            cond,
            then,
            els,
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            v.visit_expr(cond);
            walk_block(v, then);
            if let Some(els) = els {
                v.visit_stmt(els);
            }
        }
        Stmt::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(cond) = cond {
                v.visit_expr(cond);
            }
            if let Some(post) = post {
                v.visit_stmt(post);
            }
            walk_block(v, body);
        }
        Stmt::Range {
            key,
            value,
            x,
            body,
            ..
        } => {
            for expr in key.iter().chain(value.iter()) {
                v.visit_expr(expr);
            }
            v.visit_expr(x);
            walk_block(v, body);
        }
        Stmt::Switch { init, tag, clauses } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(tag) = tag {
                v.visit_expr(tag);
            }
            for clause in clauses {
                for expr in &clause.list {
                    v.visit_expr(expr);
                }
                for stmt in &clause.body {
                    v.visit_stmt(stmt);
                }
            }
        }
        Stmt::Empty => {}
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Ident(name) => v.visit_ident(expr.id, name),
        ExprKind::BasicLit(_) | ExprKind::Ellipsis => {}
        ExprKind::CompositeLit { typ, elts } => {
            if let Some(typ) = typ {
                v.visit_type(typ);
            }
            for elt in elts {
                v.visit_expr(elt);
            }
        }
        ExprKind::KeyValue { key, value } => {
            v.visit_expr(key);
            v.visit_expr(value);
        }
        ExprKind::FuncLit { sig, body } => {
            walk_sig(v, sig);
            walk_block(v, body);
        }
        ExprKind::Paren(inner) | ExprKind::Star(inner) => v.visit_expr(inner),
        ExprKind::Selector { x, sel } => {
            v.visit_expr(x);
            v.visit_ident(sel.id, &sel.name);
        }
        ExprKind::Index { x, index } => {
            v.visit_expr(x);
            v.visit_expr(index);
        }
        ExprKind::Slice { x, low, high } => {
            v.visit_expr(x);
            for bound in low.iter().chain(high.iter()) {
                v.visit_expr(bound);
            }
        }
        ExprKind::Call { fun, args } => {
            v.visit_expr(fun);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        ExprKind::Unary { x, .. } => v.visit_expr(x),
        ExprKind::Binary { x, y, .. } => {
            v.visit_expr(x);
            v.visit_expr(y);
        }
        ExprKind::Type(typ) => v.visit_type(typ),
    }
}

pub fn walk_type<V: Visitor + ?Sized>(v: &mut V, typ: &TypeExpr) {
    match typ {
        TypeExpr::Name(_) | TypeExpr::Qualified { .. } | TypeExpr::Interface => {}
        TypeExpr::Array { len, elem } => {
            if let Some(len) = len {
                v.visit_expr(len);
            }
            v.visit_type(elem);
        }
        TypeExpr::Pointer(elem) => v.visit_type(elem),
        TypeExpr::Map { key, value } => {
            v.visit_type(key);
            v.visit_type(value);
        }
        TypeExpr::Func(sig) => walk_sig(v, sig),
        TypeExpr::Struct(fields) => {
            for field in fields {
                walk_field(v, field);
            }
        }
    }
}

fn walk_sig<V: Visitor + ?Sized>(v: &mut V, sig: &FuncSig) {
    for field in sig.params.iter().chain(&sig.results) {
        walk_field(v, field);
    }
}

fn walk_field<V: Visitor + ?Sized>(v: &mut V, field: &Field) {
    for name in &field.names {
        v.visit_ident(name.id, &name.name);
    }
    v.visit_type(&field.typ);
}
