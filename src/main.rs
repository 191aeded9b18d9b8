//! orrery CLI entry point.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use orrery::config::Config;
use orrery::server;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "orrery", version, about = "3D photo gallery server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gallery server
    Serve {
        /// Path to orrery.toml (built-in defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,

        /// Override the configured database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Override the configured uploads directory
        #[arg(long)]
        uploads: Option<PathBuf>,
    },

    /// Validate a configuration file and exit
    Check {
        /// Path to orrery.toml
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve {
            config,
            port,
            db,
            uploads,
        } => {
            let mut config = Config::load_or_default(config.as_deref())?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(db) = db {
                config.storage.db_path = db;
            }
            if let Some(uploads) = uploads {
                config.storage.uploads_dir = uploads;
            }
            server::serve(config).await
        },
        Commands::Check { config } => {
            let config = Config::load_from(&config)?;
            let result = config.validate()?;
            for warning in &result.warnings {
                println!("warning: {warning}");
            }
            println!("Configuration OK");
            Ok(())
        },
    }
}
