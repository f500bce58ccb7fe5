//! Run seeds.
//!
//! Every random choice of a rewrite run (strategy, keys, chunking, shuffles) is drawn from
//! one [`StdRng`] derived from a [`Seed`]. The same seed over the same input reproduces the
//! same output; reports only ever carry the seed's hash.

use crate::result::Error;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::str::FromStr;

const CONTENT_DOMAIN: &[u8] = b"litmask/content-seed";
const RNG_DOMAIN: &[u8] = b"litmask/literal-rng";
const REPORT_DOMAIN: &[u8] = b"litmask/report-hash";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed([u8; 32]);

impl Seed {
    /// Seed derived from the package content, used when the caller gives none.
    pub fn from_content(content: &[u8]) -> Self {
        Self(digest(CONTENT_DOMAIN, content))
    }

    /// Parses 64 hex digits, optionally prefixed with `0x`.
    pub fn from_hex(text: &str) -> Result<Self, Error> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        if digits.len() != 64 {
            return Err(Error::InvalidSeedLength(digits.len()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| Error::InvalidSeedHex)?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// The generator every randomized decision of a run draws from.
    pub fn create_deterministic_rng(&self) -> StdRng {
        StdRng::from_seed(digest(RNG_DOMAIN, &self.0))
    }

    pub fn hash(&self) -> [u8; 32] {
        digest(REPORT_DOMAIN, &self.0)
    }

    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash()))
    }
}

impl FromStr for Seed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim())
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Seed").field(&self.hash_hex()).finish()
    }
}

fn digest(domain: &[u8], data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}
