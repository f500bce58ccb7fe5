use crate::e2e::fixtures::{init_tracing, value_decl, PackageBuilder, SEED};
use litmask_core::ast::*;
use litmask_core::printer::print_file;
use litmask_core::seed::Seed;
use litmask_core::types::{BasicKind, ObjectKind, Type, TypeOracle};
use litmask_core::Package;
use litmask_transform::{obfuscate_package, ConstBlacklist, ObfuscationConfig};

/// ```go
/// const idx int = 1
/// const base int = 7
/// const derived int = base
/// const label = "untyped"
/// const code int = 404
///
/// var table = [2]string{idx: "one"}
/// ```
fn constants_package() -> Package {
    let mut b = PackageBuilder::new();
    let int = Type::Basic(BasicKind::Int);
    let mut file = File::new("consts.go", "main");

    let idx = b.declare("idx", ObjectKind::Const, int.clone());
    let base = b.declare("base", ObjectKind::Const, int.clone());
    let derived = b.declare("derived", ObjectKind::Const, int.clone());
    let label = b.declare(
        "label",
        ObjectKind::Const,
        Type::Basic(BasicKind::UntypedString),
    );
    let code = b.declare("code", ObjectKind::Const, int.clone());

    for (obj, name, text) in [(idx, "idx", "1"), (base, "base", "7")] {
        let value = b.int(text, BasicKind::Int);
        let name = b.name(obj, name);
        file.decls
            .push(value_decl(DeclToken::Const, name, Some("int"), Some(value)));
    }

    let value = b.reference(base, "base", int.clone());
    let name = b.name(derived, "derived");
    file.decls
        .push(value_decl(DeclToken::Const, name, Some("int"), Some(value)));

    let value = b.lit(
        BasicLit::string("untyped"),
        Type::Basic(BasicKind::UntypedString),
    );
    let name = b.name(label, "label");
    file.decls
        .push(value_decl(DeclToken::Const, name, None, Some(value)));

    let value = b.int("404", BasicKind::Int);
    let name = b.name(code, "code");
    file.decls
        .push(value_decl(DeclToken::Const, name, Some("int"), Some(value)));

    let key = b.reference(idx, "idx", int);
    let one = b.string("one");
    let table = Expr::new(ExprKind::CompositeLit {
        typ: Some(TypeExpr::Array {
            len: Some(Box::new(Expr::new(ExprKind::BasicLit(BasicLit::int("2"))))),
            elem: Box::new(TypeExpr::name("string")),
        }),
        elts: vec![Expr::new(ExprKind::KeyValue {
            key: Box::new(key),
            value: Box::new(one),
        })],
    });
    file.decls.push(value_decl(
        DeclToken::Var,
        Ident::new("table"),
        None,
        Some(table),
    ));

    b.finish(vec![file])
}

#[test]
fn test_array_keys_and_const_values_are_blacklisted() {
    let package = constants_package();
    let blacklist = ConstBlacklist::collect(&package.files, &package.info);

    let mut names: Vec<_> = blacklist
        .iter()
        .filter_map(|obj| package.info.object(obj))
        .map(|object| object.name.as_str())
        .collect();
    names.sort();
    assert_eq!(names, vec!["base", "idx"]);
}

#[test]
fn test_only_free_typed_constants_are_demoted() {
    init_tracing();
    let mut package = constants_package();
    let config = ObfuscationConfig::with_seed(Seed::from_hex(SEED).unwrap());
    let report = obfuscate_package(&mut package, &config).unwrap();
    let source = print_file(&package.files[0]);

    assert_eq!(report.demoted, 2);
    assert!(source.contains("const idx int = 1"));
    assert!(source.contains("const base int = 7"));
    assert!(source.contains("var derived int = base"));
    assert!(source.contains("const label = \"untyped\""));
    assert!(source.contains("var code int = func() int {"));
    assert!(source.contains("idx: func() string {"));

    assert_eq!(report.totals.ints, 1);
    assert_eq!(report.totals.strings, 1);
}

#[test]
fn test_blacklist_survives_repeated_collection() {
    let package = constants_package();
    let mut blacklist = ConstBlacklist::collect(&package.files, &package.info);
    for _ in 0..3 {
        ConstBlacklist::extend(&package.files, &package.info, &mut blacklist);
    }
    assert_eq!(blacklist.len(), 2);
}
