//! Module for the `print` subcommand, which renders a serialized package as Go source.

use super::read_package;
use async_trait::async_trait;
use clap::Args;
use litmask_core::printer::print_file;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `print` subcommand.
#[derive(Args)]
pub struct PrintArgs {
    /// Serialized package (JSON) to render.
    pub package: PathBuf,
}

#[async_trait]
impl super::Command for PrintArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let package = read_package(&self.package).await?;
        for file in &package.files {
            println!("// {}", file.name);
            print!("{}", print_file(file));
        }
        Ok(())
    }
}
