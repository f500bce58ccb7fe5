//! Module for the `obfuscate` subcommand, which rewrites the literals of a serialized Go
//! package.
//!
//! The package is read from JSON, run through the literal obfuscation pipeline of
//! `litmask-transform` and written back out as Go source.

use super::{read_package, CliError};
use async_trait::async_trait;
use clap::Args;
use litmask_core::printer::print_file;
use litmask_core::seed::Seed;
use litmask_transform::obfuscator::{obfuscate_package, ObfuscationConfig, ObfuscationReport};
use litmask_transform::StrategyPool;
use std::error::Error;
use std::path::{Path, PathBuf};

/// Arguments for the `obfuscate` subcommand.
#[derive(Args)]
pub struct ObfuscateArgs {
    /// Serialized package (JSON) holding the files and their type information.
    pub package: PathBuf,
    /// 32-byte hex seed. Defaults to a seed derived from the package content.
    #[arg(long, value_name = "HEX")]
    seed: Option<Seed>,
    /// Comma-separated list of decode strategies to pick from.
    #[arg(long, default_value = "simple,swap,split")]
    strategies: String,
    /// Directory to write the rewritten files to instead of stdout.
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
    /// Path to emit the obfuscation report as JSON.
    #[arg(long, value_name = "PATH")]
    emit: Option<PathBuf>,
    /// Check that every replacement evaluates to the literal it replaced.
    #[arg(long)]
    verify: bool,
}

/// Executes the `obfuscate` subcommand.
#[async_trait]
impl super::Command for ObfuscateArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let ObfuscateArgs {
            package,
            seed,
            strategies,
            out,
            emit,
            verify,
        } = self;

        let mut package = read_package(&package).await?;

        let config = ObfuscationConfig {
            seed,
            strategies: StrategyPool::from_names(&strategies)?,
        };

        let report = obfuscate_package(&mut package, &config)?;

        if verify {
            let checked = litmask_verification::verify_report(&report)?;
            tracing::info!("all {} replacements reproduce their literals", checked);
        }

        if let Some(path) = emit.as_ref() {
            write_report(path, &report).await?;
            tracing::info!("wrote obfuscation report to {}", path.display());
        }

        match out.as_ref() {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                for file in &package.files {
                    let path = output_path(dir, &file.name)?;
                    tokio::fs::write(&path, print_file(file)).await.map_err(CliError::from)?;
                    tracing::info!("wrote {}", path.display());
                }
            }
            None => {
                for file in &package.files {
                    println!("// {}", file.name);
                    print!("{}", print_file(file));
                }
            }
        }

        Ok(())
    }
}

async fn write_report(path: &Path, report: &ObfuscationReport) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Places a package file inside `dir`, keeping only its base name.
pub(crate) fn output_path(dir: &Path, name: &str) -> Result<PathBuf, CliError> {
    let base = Path::new(name)
        .file_name()
        .ok_or_else(|| CliError::InvalidFileName(name.to_string()))?;
    Ok(dir.join(base))
}
