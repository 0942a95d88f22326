//! Command-line interface for Portal
//!
//! Key management for the registry keypair and a local harness that runs
//! the full client flow against the in-memory registry program.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{address, harness, keygen};

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Portal - registry client tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "portal.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a registry keypair file
    Keygen {
        /// Output path for the keypair JSON
        #[arg(short, long)]
        out: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the registry address controlled by a keypair file
    Address {
        /// Keypair JSON to read
        #[arg(short, long)]
        keypair: PathBuf,
    },

    /// Initialize a registry, append a link and read it back
    Harness {
        /// Link to append
        #[arg(short, long, default_value = harness::DEFAULT_LINK)]
        link: String,

        /// Registry keypair; overrides the config file
        #[arg(short, long)]
        keypair: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = portal_effects::PortalConfig::load_or_default(&cli.config)?;
    config.merge_with_env();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    config.validate()?;
    portal_effects::logging::init_tracing(&config.logging.level);

    match cli.command {
        Commands::Keygen { out, force } => {
            keygen::run(&out, force).await?;
        }
        Commands::Address { keypair } => {
            address::run(&keypair).await?;
        }
        Commands::Harness { link, keypair } => {
            if let Some(path) = keypair {
                config.registry.keypair_path = Some(path);
            }
            harness::run(&config, &link).await?;
        }
    }

    Ok(())
}
