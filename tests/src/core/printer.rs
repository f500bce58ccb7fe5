use litmask_core::ast::*;
use litmask_core::printer::{print_expr, print_file, print_type};

fn ident(name: &str) -> Expr {
    Expr::new(ExprKind::Ident(name.into()))
}

fn int(text: &str) -> Expr {
    Expr::new(ExprKind::BasicLit(BasicLit::int(text)))
}

#[test]
fn test_function_body_is_tab_indented() {
    let mut file = File::new("main.go", "main");
    file.imports = vec![
        ImportSpec {
            name: None,
            path: "fmt".into(),
        },
        ImportSpec {
            name: None,
            path: "unsafe".into(),
        },
    ];
    file.decls.push(Decl::Func(FuncDecl {
        recv: None,
        name: Ident::new("main"),
        sig: FuncSig::default(),
        body: Some(Block::new(vec![Stmt::Expr(Expr::new(ExprKind::Call {
            fun: Box::new(Expr::new(ExprKind::Selector {
                x: Box::new(ident("fmt")),
                sel: Ident::new("Println"),
            })),
            args: vec![Expr::new(ExprKind::BasicLit(BasicLit::string("hi")))],
        }))])),
    }));

    assert_eq!(
        print_file(&file),
        "package main\n\nimport (\n\t\"fmt\"\n\t\"unsafe\"\n)\n\nfunc main() {\n\tfmt.Println(\"hi\")\n}\n"
    );
}

#[test]
fn test_range_and_for_loops() {
    let range = Stmt::Range {
        key: Some(ident("_")),
        value: Some(ident("b")),
        define: true,
        x: ident("data"),
        body: Block::default(),
    };
    let for_loop = Stmt::For {
        init: Some(Box::new(Stmt::Assign {
            lhs: vec![ident("i")],
            tok: AssignToken::Define,
            rhs: vec![int("0")],
        })),
        cond: Some(Expr::new(ExprKind::Binary {
            op: BinaryOp::Lss,
            x: Box::new(ident("i")),
            y: Box::new(int("4")),
        })),
        post: Some(Box::new(Stmt::Assign {
            lhs: vec![ident("i")],
            tok: AssignToken::Op(BinaryOp::Add),
            rhs: vec![int("2")],
        })),
        body: Block::default(),
    };
    let func = Expr::new(ExprKind::FuncLit {
        sig: FuncSig::default(),
        body: Block::new(vec![range, for_loop]),
    });

    assert_eq!(
        print_expr(&func),
        "func() {\n\tfor _, b := range data {\n\t}\n\tfor i := 0; i < 4; i += 2 {\n\t}\n}"
    );
}

#[test]
fn test_types_and_struct_tags() {
    let typ = TypeExpr::Struct(vec![Field {
        names: vec![Ident::new("Name")],
        typ: TypeExpr::Array {
            len: Some(Box::new(int("8"))),
            elem: Box::new(TypeExpr::name("byte")),
        },
        tag: Some(BasicLit {
            kind: LitKind::String,
            value: "`json:\"name\"`".into(),
        }),
    }]);
    assert_eq!(
        print_type(&typ),
        "struct {\n\tName [8]byte `json:\"name\"`\n}"
    );
}

#[test]
fn test_pointer_conversion_is_parenthesized() {
    let deref = Expr::new(ExprKind::Star(Box::new(ident("p"))));
    let neg = Expr::new(ExprKind::Unary {
        op: UnaryOp::Neg,
        x: Box::new(int("5")),
    });
    assert_eq!(print_expr(&deref), "*p");
    assert_eq!(print_expr(&neg), "-5");
    let index_of_sum = Expr::new(ExprKind::Index {
        x: Box::new(ident("data")),
        index: Box::new(Expr::new(ExprKind::Binary {
            op: BinaryOp::Add,
            x: Box::new(ident("i")),
            y: Box::new(int("1")),
        })),
    });
    assert_eq!(print_expr(&index_of_sum), "data[i + 1]");
}
