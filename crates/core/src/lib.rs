//! Core data model for the literal obfuscator: the syntax tree handed over by the host
//! front-end, the static type oracle, source printing and run seeding.

pub mod ast;
pub mod literal;
pub mod printer;
pub mod result;
pub mod seed;
pub mod types;
pub mod visit;

pub use result::{Error, Result};

use ast::File;
use serde::{Deserialize, Serialize};
use types::TypeInfo;

/// A compilation unit as exchanged with the host: parsed files plus their type tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub files: Vec<File>,
    pub info: TypeInfo,
}

impl Package {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Canonical serialized form of the files, used to derive content seeds.
    pub fn content_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.files)?)
    }
}
