use super::fixtures::{init_tracing, sample_package, SEED};
use litmask_core::ast::{Decl, DeclToken};
use litmask_core::printer::print_file;
use litmask_core::seed::Seed;
use litmask_core::Package;
use litmask_transform::{
    obfuscate_package, ConstBlacklist, LiteralValue, ObfuscationConfig, ObfuscationReport,
    StrategyPool,
};
use litmask_verification::verify_report;

fn run(seed: &str) -> (Package, ObfuscationReport) {
    let mut package = sample_package();
    let config = ObfuscationConfig::with_seed(Seed::from_hex(seed).unwrap());
    let report = obfuscate_package(&mut package, &config).unwrap();
    (package, report)
}

fn const_names(package: &Package) -> Vec<String> {
    package.files[0]
        .decls
        .iter()
        .filter_map(|decl| match decl {
            Decl::Gen(decl) if decl.tok == DeclToken::Const => Some(decl),
            _ => None,
        })
        .flat_map(|decl| decl.specs.iter())
        .filter_map(|spec| match spec {
            litmask_core::ast::Spec::Value(spec) => Some(spec.names[0].name.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_every_replacement_reproduces_its_literal() {
    init_tracing();
    let (_, report) = run(SEED);

    let checked = verify_report(&report).unwrap();
    assert_eq!(checked, report.totals.total());
    assert_eq!(report.totals.strings, 3);
    assert_eq!(report.totals.bytes, 3);
    assert_eq!(report.totals.ints, 2);
    assert_eq!(report.totals.floats, 1);
    assert_eq!(report.totals.bools, 1);
}

#[test]
fn test_literals_do_not_leak_into_source() {
    init_tracing();
    let (package, _) = run(SEED);
    let source = print_file(&package.files[0]);

    for secret in [
        "hello, gopher",
        "secret_token",
        "welcome aboard",
        "987654321",
        "= true",
        "[]byte{222, 173, 190, 239}",
        "[2]byte{12, 13}",
    ] {
        assert!(!source.contains(secret), "{secret:?} leaked:\n{source}");
    }
}

/// How synthesized byte literals spell `data`: `0x73, 0x65, ...`.
fn hex_run(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:#04x}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[test]
fn test_secrets_never_appear_as_hex_bytes() {
    init_tracing();
    let secrets: [&[u8]; 5] = [
        b"hello, gopher",
        b"secret_token",
        b"welcome aboard",
        &[0xde, 0xad, 0xbe, 0xef],
        &987654321u32.to_le_bytes(),
    ];
    for pool in ["simple", "swap", "split", "simple,swap,split"] {
        for n in 0..64u64 {
            let mut package = sample_package();
            let seed = Seed::from_hex(&format!("0x{n:064x}")).unwrap();
            let strategies = StrategyPool::from_names(pool).unwrap();
            let config = ObfuscationConfig::with_seed(seed).strategies(strategies);
            obfuscate_package(&mut package, &config).unwrap();
            let source = print_file(&package.files[0]);

            for secret in secrets {
                assert!(
                    !source.contains(&hex_run(secret)),
                    "{pool} seed {n} leaked {:?}:\n{source}",
                    String::from_utf8_lossy(secret)
                );
            }
        }
    }
}

#[test]
fn test_demotion_respects_blacklist_and_iota() {
    init_tracing();
    let original = sample_package();
    let (package, report) = run(SEED);

    assert_eq!(report.demoted, 2);
    assert_eq!(const_names(&original), vec!["greeting", "limit", "size", "mode"]);
    assert_eq!(const_names(&package), vec!["size", "mode"]);

    let source = print_file(&package.files[0]);
    assert!(source.contains("const size int = 4"));
    assert!(source.contains("const mode int = iota"));
    assert!(source.contains("var buf [size]byte"));
    assert!(source.contains("var greeting string = func() string {"));
}

#[test]
fn test_byte_arrays_keep_their_length() {
    init_tracing();
    let (package, report) = run(SEED);

    let arrays: Vec<_> = report
        .replacements()
        .filter_map(|r| match &r.original {
            LiteralValue::Array(data) => Some((r.typ.as_str(), data.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        arrays,
        vec![("[2]byte", vec![12, 13]), ("[4]byte", vec![1, 2, 0, 0])]
    );

    let source = print_file(&package.files[0]);
    assert!(source.contains("var header = func() [2]byte {"));
    assert!(source.contains("var newdata [2]byte"));
}

#[test]
fn test_float_pulls_in_unsafe_and_named_string_is_converted() {
    init_tracing();
    let (package, report) = run(SEED);

    assert!(report.files[0].added_unsafe);
    let imports: Vec<_> = package.files[0]
        .imports
        .iter()
        .map(|spec| spec.path.as_str())
        .collect();
    assert_eq!(imports, vec!["fmt", "unsafe"]);

    let source = print_file(&package.files[0]);
    assert!(source.contains("unsafe.Pointer(&bits)"));
    assert!(source.contains("var welcome Greeting = Greeting(func() string {"));
}

#[test]
fn test_same_seed_same_output() {
    init_tracing();
    let (first, first_report) = run(SEED);
    let (second, second_report) = run(SEED);
    assert_eq!(print_file(&first.files[0]), print_file(&second.files[0]));
    assert_eq!(first_report, second_report);

    let other = "0x0000000000000000000000000000000000000000000000000000000000000001";
    let (third, _) = run(other);
    assert_ne!(print_file(&first.files[0]), print_file(&third.files[0]));
}

#[test]
fn test_content_seed_is_reproducible() {
    init_tracing();
    let mut first = sample_package();
    let mut second = sample_package();
    let first_report = obfuscate_package(&mut first, &ObfuscationConfig::default()).unwrap();
    let second_report = obfuscate_package(&mut second, &ObfuscationConfig::default()).unwrap();

    assert_eq!(first_report.seed_hash, second_report.seed_hash);
    assert_eq!(first, second);
}

#[test]
fn test_blacklist_collection_is_idempotent() {
    let package = sample_package();
    let mut blacklist = ConstBlacklist::collect(&package.files, &package.info);
    let first = blacklist.clone();
    ConstBlacklist::extend(&package.files, &package.info, &mut blacklist);
    assert_eq!(blacklist, first);
    assert_eq!(blacklist.len(), 1);
}

#[test]
fn test_single_strategy_pools_verify() {
    init_tracing();
    for name in ["simple", "swap", "split"] {
        let mut package = sample_package();
        let config = ObfuscationConfig::with_seed(Seed::from_hex(SEED).unwrap())
            .strategies(StrategyPool::from_names(name).unwrap());
        let report = obfuscate_package(&mut package, &config).unwrap();
        assert!(report.replacements().all(|r| r.strategy == name));
        verify_report(&report).unwrap();
    }
}
