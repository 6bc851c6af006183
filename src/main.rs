//! Stillcast command-line entry point
//!
//! # Usage
//!
//! ```bash
//! stillcast assemble --image cover.png --audio episode.mp3 --output episode.mp4
//! stillcast probe --input episode.mp3
//! stillcast plan --audio episode.mp3 --chunk-size 05:00
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use stillcast::cli::{commands, Cli, Commands};
use stillcast::utils::logging::{init_logging, LogFormat};

/// Main entry point for the Stillcast CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, LogFormat::from_flag(cli.log_json))?;
    info!("Starting Stillcast {}", env!("CARGO_PKG_VERSION"));

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Assemble(args) => commands::assemble(config, args).await?,
        Commands::Probe(args) => commands::probe(config, args).await?,
        Commands::Plan(args) => commands::plan(config, args).await?,
    }

    Ok(())
}
