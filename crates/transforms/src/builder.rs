//! Constructors for the synthetic nodes that make up replacement subtrees.
//!
//! Every node built here carries [`NodeId::DUMMY`]; the type oracle never sees them.

use litmask_core::ast::*;
use litmask_core::types::BasicKind;

pub fn ident(name: &str) -> Expr {
    Expr::new(ExprKind::Ident(name.to_string()))
}

pub fn int_lit(value: u64) -> Expr {
    Expr::new(ExprKind::BasicLit(BasicLit::int(value.to_string())))
}

/// Byte literal in hex form, e.g. `0x2a`.
pub fn byte_lit(value: u8) -> Expr {
    Expr::new(ExprKind::BasicLit(BasicLit::int(format!("{value:#04x}"))))
}

pub fn byte_slice_type() -> TypeExpr {
    TypeExpr::Array {
        len: None,
        elem: Box::new(TypeExpr::name("byte")),
    }
}

pub fn byte_array_type(len: u64) -> TypeExpr {
    TypeExpr::Array {
        len: Some(Box::new(int_lit(len))),
        elem: Box::new(TypeExpr::name("byte")),
    }
}

/// `[]byte{0x.., 0x.., ...}`
pub fn byte_slice_lit(data: &[u8]) -> Expr {
    Expr::new(ExprKind::CompositeLit {
        typ: Some(byte_slice_type()),
        elts: data.iter().copied().map(byte_lit).collect(),
    })
}

pub fn call(fun: Expr, args: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::Call {
        fun: Box::new(fun),
        args,
    })
}

/// `T(x)` for a basic kind.
pub fn convert_basic(kind: BasicKind, x: Expr) -> Expr {
    call(ident(kind.name()), vec![x])
}

/// `T(x)` for a type spelled by name.
pub fn convert_named(name: &str, x: Expr) -> Expr {
    call(ident(name), vec![x])
}

pub fn index(x: Expr, idx: Expr) -> Expr {
    Expr::new(ExprKind::Index {
        x: Box::new(x),
        index: Box::new(idx),
    })
}

pub fn binary(op: BinaryOp, x: Expr, y: Expr) -> Expr {
    Expr::new(ExprKind::Binary {
        op,
        x: Box::new(x),
        y: Box::new(y),
    })
}

pub fn paren(x: Expr) -> Expr {
    Expr::new(ExprKind::Paren(Box::new(x)))
}

/// `len(x)`
pub fn len_of(x: Expr) -> Expr {
    call(ident("len"), vec![x])
}

/// Zero-argument function literal returning `ret`, invoked on the spot:
/// `func() ret { body }()`.
pub fn lambda_call(ret: TypeExpr, body: Vec<Stmt>) -> Expr {
    let func = Expr::new(ExprKind::FuncLit {
        sig: FuncSig {
            params: Vec::new(),
            results: vec![Field::unnamed(ret)],
        },
        body: Block::new(body),
    });
    call(func, Vec::new())
}

pub fn return_stmt(value: Expr) -> Stmt {
    Stmt::Return(vec![value])
}

/// `name := value`
pub fn define(name: &str, value: Expr) -> Stmt {
    Stmt::Assign {
        lhs: vec![ident(name)],
        tok: AssignToken::Define,
        rhs: vec![value],
    }
}

/// `lhs = rhs`
pub fn assign(lhs: Expr, rhs: Expr) -> Stmt {
    Stmt::Assign {
        lhs: vec![lhs],
        tok: AssignToken::Assign,
        rhs: vec![rhs],
    }
}

/// `var name typ`
pub fn var_decl(name: &str, typ: TypeExpr) -> Stmt {
    Stmt::Decl(GenDecl {
        tok: DeclToken::Var,
        specs: vec![Spec::Value(ValueSpec {
            names: vec![Ident::new(name)],
            typ: Some(typ),
            values: Vec::new(),
        })],
    })
}

/// `for key := range x { body }`
pub fn range_loop(key: &str, x: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::Range {
        key: Some(ident(key)),
        value: None,
        define: true,
        x,
        body: Block::new(body),
    }
}

/// `*(*target)(unsafe.Pointer(&var))`: reinterprets the bits of `var` as `target`.
pub fn unsafe_reinterpret(target: BasicKind, var: &str) -> Expr {
    let pointer_type = paren(Expr::new(ExprKind::Type(TypeExpr::Pointer(Box::new(
        TypeExpr::name(target.name()),
    )))));
    let unsafe_pointer = Expr::new(ExprKind::Selector {
        x: Box::new(ident("unsafe")),
        sel: Ident::new("Pointer"),
    });
    let addr = Expr::new(ExprKind::Unary {
        op: UnaryOp::Addr,
        x: Box::new(ident(var)),
    });
    Expr::new(ExprKind::Star(Box::new(call(
        pointer_type,
        vec![call(unsafe_pointer, vec![addr])],
    ))))
}
