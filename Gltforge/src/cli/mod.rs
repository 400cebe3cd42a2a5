//! Gltforge CLI - Command-line interface for scene export and GLB inspection

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "gltforge")]
#[command(version, about = "Gltforge: scene graph to glTF 2.0 / GLB exporter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the Gltforge CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
