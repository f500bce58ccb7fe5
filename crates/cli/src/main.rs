use clap::Parser;
use litmask_cli::commands::{Cmd, Command};
use tracing_subscriber::EnvFilter;

/// litmask CLI
///
/// litmask rewrites the string, byte, numeric and boolean literals of a type-checked Go
/// package into small runtime decode routines, so the values no longer appear verbatim in
/// the compiled binary.
#[derive(Parser)]
#[command(name = "litmask")]
#[command(about = "litmask: Go literal obfuscator")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

/// Runs the litmask CLI with the provided arguments.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    cli.command.execute().await
}
