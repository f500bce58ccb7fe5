use async_trait::async_trait;
use clap::Subcommand;
use litmask_core::Package;
use std::error::Error;
use std::path::Path;

pub mod obfuscate;
pub mod print;

use thiserror::Error;

/// Errors raised by the command layer itself.
#[derive(Debug, Error)]
pub enum CliError {
    /// File read/write error.
    #[error("file error: {0}")]
    File(#[from] std::io::Error),
    /// The package file is not a serialized package.
    #[error("invalid package: {0}")]
    Package(#[from] litmask_core::Error),
    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// A file name in the package cannot be used as an output path.
    #[error("invalid output file name: {0}")]
    InvalidFileName(String),
}

/// CLI subcommands for litmask.
#[derive(Subcommand)]
pub enum Cmd {
    /// Obfuscate the literals of a serialized package and print or write the Go source.
    Obfuscate(obfuscate::ObfuscateArgs),
    /// Render a serialized package as Go source without rewriting it.
    Print(print::PrintArgs),
}

/// Trait for executing CLI subcommands.
#[async_trait]
pub trait Command {
    /// Executes the subcommand.
    async fn execute(self) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Obfuscate(args) => args.execute().await,
            Cmd::Print(args) => args.execute().await,
        }
    }
}

/// Reads a package serialized as JSON.
pub(crate) async fn read_package(path: &Path) -> Result<Package, CliError> {
    let json = tokio::fs::read_to_string(path).await?;
    let package = Package::from_json(&json)?;
    tracing::debug!(
        "read {} files and {} objects from {}",
        package.files.len(),
        package.info.object_count(),
        path.display()
    );
    Ok(package)
}
