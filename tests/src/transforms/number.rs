use crate::e2e::fixtures::{func_decl, init_tracing, value_decl, PackageBuilder, SEED};
use litmask_core::ast::*;
use litmask_core::printer::print_file;
use litmask_core::seed::Seed;
use litmask_core::types::{BasicKind, ObjectKind, Type};
use litmask_transform::number::{obfuscate_number, NumericTarget};
use litmask_transform::{obfuscate_package, LiteralValue, ObfuscationConfig, StrategyPool};
use litmask_verification::{verify_report, Evaluator};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Declares `var <name> <typ> = <value>` with the object typed as `typ`.
fn typed_var(b: &mut PackageBuilder, name: &str, typ: &str, obj_type: Type, value: Expr) -> Decl {
    let obj = b.declare(name, ObjectKind::Var, obj_type);
    let ident = b.name(obj, name);
    value_decl(DeclToken::Var, ident, Some(typ), Some(value))
}

#[test]
fn test_integer_extremes_and_named_targets() {
    init_tracing();
    let mut b = PackageBuilder::new();
    let level = Type::named("Level", Type::Basic(BasicKind::Int8));

    let lo = b.neg(BasicLit::int("128"), Type::Basic(BasicKind::Int8));
    let hi = b.int("18446744073709551615", BasicKind::Uint64);
    let lvl = b.neg(BasicLit::int("3"), level.clone());
    let decls = vec![
        typed_var(&mut b, "lo", "int8", Type::Basic(BasicKind::Int8), lo),
        typed_var(&mut b, "hi", "uint64", Type::Basic(BasicKind::Uint64), hi),
        typed_var(&mut b, "lvl", "Level", level, lvl),
    ];

    let mut file = File::new("limits.go", "main");
    file.decls = decls;
    let mut package = b.finish(vec![file]);
    let config = ObfuscationConfig::with_seed(Seed::from_hex(SEED).unwrap());
    let report = obfuscate_package(&mut package, &config).unwrap();
    assert_eq!(verify_report(&report).unwrap(), 3);

    let originals: Vec<_> = report
        .replacements()
        .map(|r| (r.typ.as_str(), r.original.clone()))
        .collect();
    assert_eq!(
        originals,
        vec![
            (
                "int8",
                LiteralValue::Int {
                    bits: 0x80,
                    kind: BasicKind::Int8
                }
            ),
            (
                "uint64",
                LiteralValue::Int {
                    bits: u64::MAX,
                    kind: BasicKind::Uint64
                }
            ),
            (
                "Level",
                LiteralValue::Int {
                    bits: 0xfd,
                    kind: BasicKind::Int8
                }
            ),
        ]
    );

    let source = print_file(&package.files[0]);
    assert!(source.contains("var lvl Level = Level(func() int8 {"));
    assert!(!source.contains("18446744073709551615"));
    assert!(!report.files[0].added_unsafe);
}

#[test]
fn test_float32_is_rounded_once() {
    init_tracing();
    let mut b = PackageBuilder::new();
    let value = b.lit(BasicLit::float("0.1"), Type::Basic(BasicKind::Float32));
    let decl = typed_var(&mut b, "f", "float32", Type::Basic(BasicKind::Float32), value);

    let mut file = File::new("float.go", "main");
    file.decls.push(decl);
    let mut package = b.finish(vec![file]);
    let config = ObfuscationConfig::with_seed(Seed::from_hex(SEED).unwrap());
    let report = obfuscate_package(&mut package, &config).unwrap();
    verify_report(&report).unwrap();

    let replacement = report.replacements().next().unwrap();
    assert_eq!(
        replacement.original,
        LiteralValue::Float {
            value: f64::from(0.1f32),
            kind: BasicKind::Float32
        }
    );
    assert!(report.files[0].added_unsafe);
    assert!(print_file(&package.files[0]).contains("*(*float32)(unsafe.Pointer(&bits))"));
}

#[test]
fn test_out_of_range_literal_is_left_alone() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(7);
    let pool = StrategyPool::default();
    let target = NumericTarget {
        kind: BasicKind::Uint8,
        named: None,
    };
    assert!(obfuscate_number(&BasicLit::int("300"), false, &target, &pool, &mut rng).is_none());
    assert!(obfuscate_number(&BasicLit::int("1"), true, &target, &pool, &mut rng).is_none());

    let mut b = PackageBuilder::new();
    let value = b.int("300", BasicKind::Uint8);
    let decl = typed_var(&mut b, "small", "uint8", Type::Basic(BasicKind::Uint8), value);
    let mut file = File::new("range.go", "main");
    file.decls.push(decl);
    let mut package = b.finish(vec![file]);
    let config = ObfuscationConfig::with_seed(Seed::from_hex(SEED).unwrap());
    let report = obfuscate_package(&mut package, &config).unwrap();

    assert_eq!(report.totals.total(), 0);
    assert!(print_file(&package.files[0]).contains("var small uint8 = 300"));
}

#[test]
fn test_every_integer_width_evaluates() {
    let pool = StrategyPool::default();
    let mut rng = StdRng::seed_from_u64(11);
    let cases = [
        (BasicKind::Int16, "32767", false),
        (BasicKind::Int32, "2147483648", true),
        (BasicKind::Uint32, "0xdeadbeef", false),
        (BasicKind::Int64, "0o777", true),
        (BasicKind::Uintptr, "4096", false),
    ];
    for (kind, text, negative) in cases {
        let target = NumericTarget { kind, named: None };
        let out = obfuscate_number(&BasicLit::int(text), negative, &target, &pool, &mut rng)
            .unwrap();
        let value = Evaluator::new().eval(&out.expr).unwrap();
        assert!(
            litmask_verification::matches_original(&out.value, &value),
            "{kind} {text}: {value}"
        );
    }
}

/// ```go
/// var zero float64 = -0.0
/// var scaled float64 = ratio * -0.0
///
/// func sign() float64 { return -0.0 }
/// ```
#[test]
fn test_negated_zero_float_stays_positive_zero() {
    init_tracing();
    let float64 = Type::Basic(BasicKind::Float64);
    let mut b = PackageBuilder::new();

    let zero = b.neg(BasicLit::float("0.0"), float64.clone());
    let zero = typed_var(&mut b, "zero", "float64", float64.clone(), zero);

    let operand = b.lit(BasicLit::float("0.0"), float64.clone());
    let scaled = Expr::new(ExprKind::Binary {
        op: BinaryOp::Mul,
        x: Box::new(Expr::new(ExprKind::Ident("ratio".into()))),
        y: Box::new(Expr::new(ExprKind::Unary {
            op: UnaryOp::Neg,
            x: Box::new(operand),
        })),
    });
    let scaled = value_decl(
        DeclToken::Var,
        Ident::new("scaled"),
        Some("float64"),
        Some(scaled),
    );

    let result = b.lit(BasicLit::float("0.0"), float64);
    let sign = func_decl(
        "sign",
        vec![Stmt::Return(vec![Expr::new(ExprKind::Unary {
            op: UnaryOp::Neg,
            x: Box::new(result),
        })])],
    );

    let mut file = File::new("zero.go", "main");
    file.decls = vec![zero, scaled, sign];
    let mut package = b.finish(vec![file]);
    let config = ObfuscationConfig::with_seed(Seed::from_hex(SEED).unwrap());
    let report = obfuscate_package(&mut package, &config).unwrap();
    assert_eq!(verify_report(&report).unwrap(), 1);

    let replacement = report.replacements().next().unwrap();
    let LiteralValue::Float { value, .. } = &replacement.original else {
        panic!("expected a float, got {:?}", replacement.original);
    };
    assert_eq!(value.to_bits(), 0);

    let source = print_file(&package.files[0]);
    assert!(source.contains("var zero float64 = func() float64 {"));
    assert!(source.contains("return -0.0"), "{source}");
    assert_eq!(source.matches("-0.0").count(), 2, "{source}");
}
