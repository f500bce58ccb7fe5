use litmask_core::seed::Seed;
use litmask_core::Error;
use rand::Rng;

const SEED_HEX: &str = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";

fn draws(seed: &Seed) -> Vec<u64> {
    let mut rng = seed.create_deterministic_rng();
    (0..8).map(|_| rng.random()).collect()
}

#[test]
fn test_rng_is_a_function_of_the_seed() {
    let seed = Seed::from_hex(SEED_HEX).unwrap();
    assert_eq!(draws(&seed), draws(&seed));

    let ones: Seed = format!("0x{}", "11".repeat(32)).parse().unwrap();
    let twos: Seed = format!("0x{}", "22".repeat(32)).parse().unwrap();
    assert_ne!(draws(&ones), draws(&twos));
}

#[test]
fn test_seeds_differing_in_last_byte_diverge() {
    let mut text = SEED_HEX.to_string();
    text.replace_range(65.., "e");
    let other = Seed::from_hex(&text).unwrap();
    assert_ne!(draws(&Seed::from_hex(SEED_HEX).unwrap()), draws(&other));
}

#[test]
fn test_report_hash_is_not_the_seed() {
    let seed = Seed::from_hex(SEED_HEX).unwrap();
    let hash = seed.hash_hex();
    assert_eq!(hash, seed.hash_hex());
    assert_eq!(hash.len(), 66);
    assert_ne!(hash, seed.to_hex());
}

#[test]
fn test_hex_round_trip_and_prefix() {
    let seed = Seed::from_hex(SEED_HEX).unwrap();
    assert_eq!(seed.to_hex(), SEED_HEX);
    let unprefixed = Seed::from_hex(SEED_HEX.trim_start_matches("0x")).unwrap();
    assert_eq!(seed, unprefixed);
}

#[test]
fn test_invalid_seeds_rejected() {
    assert!(matches!(
        Seed::from_hex("0x1234"),
        Err(Error::InvalidSeedLength(4))
    ));
    let not_hex = format!("0x{}", "zz".repeat(32));
    assert!(matches!(Seed::from_hex(&not_hex), Err(Error::InvalidSeedHex)));
    assert!("".parse::<Seed>().is_err());
}

#[test]
fn test_content_seed_tracks_content() {
    let a = Seed::from_content(b"package main");
    let b = Seed::from_content(b"package main");
    let c = Seed::from_content(b"package lib");
    assert_eq!(a, b);
    assert_ne!(a, c);
}
