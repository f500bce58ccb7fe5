use crate::e2e::fixtures::{init_tracing, sample_package, SEED};
use litmask_core::printer::{print_expr, print_file};
use litmask_core::seed::Seed;
use litmask_transform::builder::{self, byte_slice_lit, ident};
use litmask_transform::strategy::{Simple, Split, Swap};
use litmask_transform::{
    obfuscate_package, DecodeBlock, Error, ObfuscationConfig, Strategy, StrategyPool,
};
use litmask_verification::{verify_report, Evaluator, Value};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Stores the bytes as they are, in a named variable.
struct Plain;

impl Strategy for Plain {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn obfuscate(&self, data: &[u8], _rng: &mut StdRng) -> DecodeBlock {
        DecodeBlock {
            stmts: vec![builder::define("data", byte_slice_lit(data))],
            result: ident("data"),
        }
    }
}

/// Returns the bytes as a bare expression with no statements.
struct Inline;

impl Strategy for Inline {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn obfuscate(&self, data: &[u8], _rng: &mut StdRng) -> DecodeBlock {
        DecodeBlock {
            stmts: Vec::new(),
            result: byte_slice_lit(data),
        }
    }
}

fn decode(block: DecodeBlock) -> Value {
    let (mut stmts, name) = block.into_named();
    stmts.push(builder::return_stmt(ident(&name)));
    let expr = builder::lambda_call(builder::byte_slice_type(), stmts);
    Evaluator::new().eval(&expr).unwrap()
}

#[test]
fn test_strategies_emit_their_decoder_shape() {
    let mut rng = StdRng::seed_from_u64(21);
    let input = b"token=abc123";
    let shapes: [(&dyn Strategy, &str); 3] = [
        (&Simple, "for i := range data {"),
        (&Swap, "positions := []int{"),
        (&Split, "data = append(data, "),
    ];
    for (strategy, shape) in shapes {
        let block = strategy.obfuscate(input, &mut rng);
        let printed = print_expr(&builder::lambda_call(
            builder::byte_slice_type(),
            block.stmts.clone(),
        ));
        assert!(printed.contains(shape), "{}:\n{printed}", strategy.name());
        assert_eq!(decode(block), Value::Bytes(input.to_vec()));
    }
}

#[test]
fn test_empty_input_decodes_to_empty() {
    let mut rng = StdRng::seed_from_u64(3);
    for strategy in [&Simple as &dyn Strategy, &Swap, &Split] {
        let block = strategy.obfuscate(&[], &mut rng);
        assert_eq!(decode(block), Value::Bytes(Vec::new()), "{}", strategy.name());
    }
}

#[test]
fn test_custom_strategies_plug_into_the_pipeline() {
    init_tracing();
    let pool = StrategyPool::new(vec![Box::new(Plain), Box::new(Inline)]).unwrap();
    assert_eq!(pool.names(), vec!["plain", "inline"]);

    let mut package = sample_package();
    let config = ObfuscationConfig::with_seed(Seed::from_hex(SEED).unwrap()).strategies(pool);
    let report = obfuscate_package(&mut package, &config).unwrap();
    verify_report(&report).unwrap();

    let used: Vec<_> = report.replacements().map(|r| r.strategy.as_str()).collect();
    assert!(used.iter().all(|name| *name == "plain" || *name == "inline"));

    let source = print_file(&package.files[0]);
    if used.contains(&"inline") {
        assert!(source.contains("decoded := []byte{"));
    }
}

#[test]
fn test_pool_configuration_errors() {
    assert!(matches!(StrategyPool::new(Vec::new()), Err(Error::EmptyStrategyPool)));
    assert!(matches!(StrategyPool::from_names(" , "), Err(Error::EmptyStrategyPool)));
    assert!(matches!(
        StrategyPool::from_names("swap,xor"),
        Err(Error::UnknownStrategy(name)) if name == "xor"
    ));
    assert_eq!(
        StrategyPool::from_names("split,simple").unwrap().names(),
        vec!["split", "simple"]
    );
}

#[test]
fn test_encoded_bytes_never_spell_the_input() {
    let input = b"secret_token";
    let run = input
        .iter()
        .map(|b| format!("{b:#04x}"))
        .collect::<Vec<_>>()
        .join(", ");
    for strategy in [&Simple as &dyn Strategy, &Swap, &Split] {
        for seed in 0..8000 {
            let mut rng = StdRng::seed_from_u64(seed);
            let block = strategy.obfuscate(input, &mut rng);
            let printed = print_expr(&builder::lambda_call(
                builder::byte_slice_type(),
                block.stmts,
            ));
            assert!(
                !printed.contains(&run),
                "{} seed {seed}:\n{printed}",
                strategy.name()
            );
        }
    }
}
