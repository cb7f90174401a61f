//! Validation Daemon - data-quality checks against a SPARQL store
//!
//! The validation daemon provides:
//! - REST API to trigger and inspect executions
//! - Concurrent evaluation of a configured rule catalog
//! - Persistent execution, validation and error records
//! - Recovery of executions interrupted by a restart

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validation_daemon::{DaemonConfig, Server};

/// Validation Daemon CLI
#[derive(Parser)]
#[command(name = "validationd")]
#[command(about = "Validation Daemon - runs validation rule sets against a SPARQL store", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "VALIDATION_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "VALIDATION_LISTEN_ADDR")]
    listen: Option<String>,

    /// Validation catalog file
    #[arg(long, env = "VALIDATION_CATALOG")]
    catalog: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "VALIDATION_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "VALIDATION_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config =
        DaemonConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse::<std::net::SocketAddr>()
            .with_context(|| format!("Invalid listen address: {}", listen))?;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.json = true;
    }
    if let Some(catalog) = cli.catalog {
        config.catalog_path = Some(catalog);
    }

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        "Starting validation daemon"
    );

    // Create and run server
    let server = Server::new(config).context("Failed to initialize server")?;
    server.run().await?;
    Ok(())
}
