//! Owned, Go-shaped syntax tree consumed and rewritten by the literal obfuscator.
//!
//! Front-ends assign a [`NodeId`] to every expression and identifier that the type oracle
//! can resolve. Nodes synthesized by the rewriter carry [`NodeId::DUMMY`] and are never
//! looked up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a syntax node as known to the type oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Marker for synthesized nodes.
    pub const DUMMY: NodeId = NodeId(u32::MAX);

    pub fn is_dummy(self) -> bool {
        self == Self::DUMMY
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::DUMMY
    }
}

/// A declared or referenced name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    #[serde(default)]
    pub id: NodeId,
    pub name: String,
}

impl Ident {
    /// Creates a synthetic identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::DUMMY,
            name: name.into(),
        }
    }

    /// Creates an identifier the type oracle can resolve.
    pub fn with_id(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    /// File name, used for output paths and log lines.
    pub name: String,
    pub package: String,
    #[serde(default)]
    pub imports: Vec<ImportSpec>,
    #[serde(default)]
    pub decls: Vec<Decl>,
}

impl File {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            imports: Vec::new(),
            decls: Vec::new(),
        }
    }

    /// Returns true if `path` is imported by this file.
    pub fn imports_path(&self, path: &str) -> bool {
        self.imports.iter().any(|spec| spec.path == path)
    }
}

/// `import name "path"`. The path is stored unquoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Gen(GenDecl),
    Func(FuncDecl),
}

/// Token that introduces a generic declaration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclToken {
    Const,
    Var,
    Type,
}

impl DeclToken {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclToken::Const => "const",
            DeclToken::Var => "var",
            DeclToken::Type => "type",
        }
    }
}

/// `const (...)`, `var (...)` or `type (...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenDecl {
    pub tok: DeclToken,
    pub specs: Vec<Spec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Spec {
    Value(ValueSpec),
    Type(TypeSpec),
}

/// Names, optional type and optional values of a const or var spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    #[serde(default)]
    pub typ: Option<TypeExpr>,
    #[serde(default)]
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub name: Ident,
    pub typ: TypeExpr,
    #[serde(default)]
    pub alias: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    #[serde(default)]
    pub recv: Option<Field>,
    pub name: Ident,
    pub sig: FuncSig,
    #[serde(default)]
    pub body: Option<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuncSig {
    #[serde(default)]
    pub params: Vec<Field>,
    #[serde(default)]
    pub results: Vec<Field>,
}

/// Parameter, result or struct field. Struct tags keep their raw token text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub names: Vec<Ident>,
    pub typ: TypeExpr,
    #[serde(default)]
    pub tag: Option<BasicLit>,
}

impl Field {
    pub fn unnamed(typ: TypeExpr) -> Self {
        Self {
            names: Vec::new(),
            typ,
            tag: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignToken {
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `op=`
    Op(BinaryOp),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Decl(GenDecl),
    Expr(Expr),
    Assign {
        lhs: Vec<Expr>,
        tok: AssignToken,
        rhs: Vec<Expr>,
    },
    IncDec {
        x: Expr,
        inc: bool,
    },
    Return(Vec<Expr>),
    Block(Block),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        els: Option<Box<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        x: Expr,
        body: Block,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        clauses: Vec<CaseClause>,
    },
    Empty,
}

/// One `case` arm. An empty list is the `default` arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseClause {
    pub list: Vec<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(default)]
    pub id: NodeId,
    pub kind: ExprKind,
}

impl Expr {
    /// Creates a synthetic expression.
    pub fn new(kind: ExprKind) -> Self {
        Self {
            id: NodeId::DUMMY,
            kind,
        }
    }

    pub fn with_id(id: NodeId, kind: ExprKind) -> Self {
        Self { id, kind }
    }

    /// Returns the basic literal if this expression is one.
    pub fn as_basic_lit(&self) -> Option<&BasicLit> {
        match &self.kind {
            ExprKind::BasicLit(lit) => Some(lit),
            _ => None,
        }
    }

    /// Returns the identifier name if this expression is a bare identifier.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Ident(String),
    BasicLit(BasicLit),
    CompositeLit {
        typ: Option<TypeExpr>,
        elts: Vec<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    FuncLit {
        sig: FuncSig,
        body: Block,
    },
    Paren(Box<Expr>),
    Selector {
        x: Box<Expr>,
        sel: Ident,
    },
    Index {
        x: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        x: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
    },
    Call {
        fun: Box<Expr>,
        args: Vec<Expr>,
    },
    Star(Box<Expr>),
    Unary {
        op: UnaryOp,
        x: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        x: Box<Expr>,
        y: Box<Expr>,
    },
    /// A type used in expression position, e.g. the callee of a conversion.
    Type(TypeExpr),
    /// `...` as an array length.
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// A literal token. `value` is the token text exactly as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicLit {
    pub kind: LitKind,
    pub value: String,
}

impl BasicLit {
    pub fn int(value: impl Into<String>) -> Self {
        Self {
            kind: LitKind::Int,
            value: value.into(),
        }
    }

    pub fn float(value: impl Into<String>) -> Self {
        Self {
            kind: LitKind::Float,
            value: value.into(),
        }
    }

    /// Interpreted string literal for `s`.
    pub fn string(s: &str) -> Self {
        Self {
            kind: LitKind::String,
            value: crate::literal::quote(s.as_bytes()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Pos,
    /// `!x`
    Not,
    /// `^x`
    BitNot,
    /// `&x`
    Addr,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "^",
            UnaryOp::Addr => "&",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    LAnd,
    LOr,
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Quo => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::AndNot => "&^",
            BinaryOp::LAnd => "&&",
            BinaryOp::LOr => "||",
            BinaryOp::Eql => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lss => "<",
            BinaryOp::Leq => "<=",
            BinaryOp::Gtr => ">",
            BinaryOp::Geq => ">=",
        }
    }

    /// Go operator precedence, 5 binds tightest.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul
            | BinaryOp::Quo
            | BinaryOp::Rem
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::And
            | BinaryOp::AndNot => 5,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
            BinaryOp::Eql
            | BinaryOp::Neq
            | BinaryOp::Lss
            | BinaryOp::Leq
            | BinaryOp::Gtr
            | BinaryOp::Geq => 3,
            BinaryOp::LAnd => 2,
            BinaryOp::LOr => 1,
        }
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() == 3
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type syntax. Array lengths are expressions so the eligibility analyzer can inspect them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    Name(String),
    Qualified {
        package: String,
        name: String,
    },
    /// `[len]elem`, or `[]elem` when `len` is `None`.
    Array {
        len: Option<Box<Expr>>,
        elem: Box<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Func(FuncSig),
    Struct(Vec<Field>),
    Interface,
}

impl TypeExpr {
    pub fn name(name: impl Into<String>) -> Self {
        TypeExpr::Name(name.into())
    }

    pub fn is_slice(&self) -> bool {
        matches!(self, TypeExpr::Array { len: None, .. })
    }
}
