use crate::e2e::fixtures::{
    func_decl, init_tracing, println, value_decl, PackageBuilder, SEED,
};
use litmask_core::ast::*;
use litmask_core::printer::print_file;
use litmask_core::seed::Seed;
use litmask_core::types::{BasicKind, ObjectKind, Type};
use litmask_transform::{obfuscate_package, Error, ObfuscationConfig, ObfuscationReport};
use litmask_verification::verify_report;

fn obfuscate(b: PackageBuilder, decls: Vec<Decl>) -> (String, ObfuscationReport) {
    init_tracing();
    let mut file = File::new("main.go", "main");
    file.decls = decls;
    let mut package = b.finish(vec![file]);
    let config = ObfuscationConfig::with_seed(Seed::from_hex(SEED).unwrap());
    let report = obfuscate_package(&mut package, &config).unwrap();
    verify_report(&report).unwrap();
    (print_file(&package.files[0]), report)
}

fn ident(name: &str) -> Expr {
    Expr::new(ExprKind::Ident(name.into()))
}

#[test]
fn test_map_keys_stay_literal_values_do_not() {
    let mut b = PackageBuilder::new();
    let key = b.string("region");
    let value = b.string("eu-west");
    let map = Expr::new(ExprKind::CompositeLit {
        typ: Some(TypeExpr::Map {
            key: Box::new(TypeExpr::name("string")),
            value: Box::new(TypeExpr::name("string")),
        }),
        elts: vec![Expr::new(ExprKind::KeyValue {
            key: Box::new(key),
            value: Box::new(value),
        })],
    });
    let (source, report) = obfuscate(
        b,
        vec![value_decl(DeclToken::Var, Ident::new("m"), None, Some(map))],
    );

    assert_eq!(report.totals.strings, 1);
    assert!(source.contains("\"region\": func() string {"));
    assert!(!source.contains("eu-west"));
}

#[test]
fn test_case_labels_and_index_operands_stay_literal() {
    let mut b = PackageBuilder::new();
    let label = b.string("start");
    let message = b.string("starting up");
    let idx = b.int("3", BasicKind::Int);
    let switch = Stmt::Switch {
        init: None,
        tag: Some(ident("cmd")),
        clauses: vec![CaseClause {
            list: vec![label],
            body: vec![println(vec![message])],
        }],
    };
    let read = println(vec![Expr::new(ExprKind::Index {
        x: Box::new(ident("args")),
        index: Box::new(idx),
    })]);
    let (source, report) = obfuscate(b, vec![func_decl("run", vec![switch, read])]);

    assert_eq!(report.totals.total(), 1);
    assert!(source.contains("case \"start\":"));
    assert!(source.contains("args[3]"));
    assert!(!source.contains("starting up"));
}

#[test]
fn test_binary_operands_and_results_are_replaced() {
    let mut b = PackageBuilder::new();
    let five = b.int("5", BasicKind::Int);
    let text = b.string("done");
    let sum = Expr::new(ExprKind::Binary {
        op: BinaryOp::Add,
        x: Box::new(ident("n")),
        y: Box::new(five),
    });
    let body = vec![
        Stmt::Assign {
            lhs: vec![ident("n")],
            tok: AssignToken::Assign,
            rhs: vec![sum],
        },
        Stmt::Return(vec![text]),
    ];
    let (source, report) = obfuscate(b, vec![func_decl("step", body)]);

    assert_eq!(report.totals.ints, 1);
    assert_eq!(report.totals.strings, 1);
    assert!(source.contains("n = n + func() int {"));
    assert!(source.contains("return func() string {"));
}

#[test]
fn test_untouchable_literals() {
    let mut b = PackageBuilder::new();
    let empty = b.string("");
    let rune = b.lit(
        BasicLit {
            kind: LitKind::Char,
            value: "'a'".into(),
        },
        Type::Basic(BasicKind::Int32),
    );
    let duration = Type::Named {
        name: "time.Duration".into(),
        local: false,
        underlying: Box::new(Type::Basic(BasicKind::Int64)),
    };
    let timeout = b.lit(BasicLit::int("30"), duration);
    let shadow = b.declare("true", ObjectKind::Var, Type::Basic(BasicKind::Bool));
    let shadowed = b.reference(shadow, "true", Type::Basic(BasicKind::Bool));
    let nested = b.lit(BasicLit::int("1"), Type::byte());
    let elided = Expr::new(ExprKind::CompositeLit {
        typ: Some(TypeExpr::Array {
            len: None,
            elem: Box::new(TypeExpr::Array {
                len: None,
                elem: Box::new(TypeExpr::name("byte")),
            }),
        }),
        elts: vec![Expr::new(ExprKind::CompositeLit {
            typ: None,
            elts: vec![nested],
        })],
    });

    let (source, report) = obfuscate(
        b,
        vec![func_decl(
            "main",
            vec![println(vec![empty, rune, timeout, shadowed, elided])],
        )],
    );

    assert_eq!(report.totals.total(), 0);
    assert!(source.contains("fmt.Println(\"\", 'a', 30, true, [][]byte{{1}})"));
}

#[test]
fn test_byte_slice_with_non_literal_element_is_skipped() {
    let mut b = PackageBuilder::new();
    let mut slice = b.byte_slice(&[1]);
    if let ExprKind::CompositeLit { elts, .. } = &mut slice.kind {
        elts.push(ident("x"));
    }
    let (source, report) = obfuscate(
        b,
        vec![value_decl(DeclToken::Var, Ident::new("raw"), None, Some(slice))],
    );

    assert_eq!(report.totals.bytes, 0);
    assert!(source.contains("var raw = []byte{1, x}"));
}

#[test]
fn test_malformed_string_leaves_package_untouched() {
    init_tracing();
    let mut b = PackageBuilder::new();
    let good = b.string("fine");
    let bad = b.lit(
        BasicLit {
            kind: LitKind::String,
            value: r#""\x4""#.into(),
        },
        Type::string(),
    );
    let mut file = File::new("broken.go", "main");
    file.decls.push(func_decl("main", vec![println(vec![good, bad])]));
    let mut package = b.finish(vec![file]);
    let before = package.clone();

    let config = ObfuscationConfig::with_seed(Seed::from_hex(SEED).unwrap());
    let err = obfuscate_package(&mut package, &config).unwrap_err();
    assert!(matches!(err, Error::MalformedLiteral { ref file, .. } if file == "broken.go"));
    assert_eq!(package, before);
}
