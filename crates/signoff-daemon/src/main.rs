//! Signoff Daemon - Approval workflow and notification service
//!
//! The signoff daemon provides:
//! - REST API for creating, submitting, approving, and rejecting reports
//! - Per-user notification inbox with read-state tracking
//! - Live event streaming to connected clients
//! - Background due-date sweep with overdue escalation

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod server;

use config::DaemonConfig;
use error::{DaemonError, DaemonResult};
use server::Server;

/// Signoff Daemon CLI
#[derive(Parser)]
#[command(name = "signoffd")]
#[command(about = "Signoff Daemon - Approval workflow and notification service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SIGNOFF_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "SIGNOFF_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level
    #[arg(long, env = "SIGNOFF_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "SIGNOFF_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config =
        DaemonConfig::load(cli.config.as_deref()).map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

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

    // Print startup banner
    println!(
        r#"
  ____   ___   ____  _   _   ___   _____  _____
 / ___| |_ _| / ___|| \ | | / _ \ |  ___||  ___|
 \___ \  | | | |  _ |  \| || | | || |_   | |_
  ___) | | | | |_| || |\  || |_| ||  _|  |  _|
 |____/ |___| \____||_| \_| \___/ |_|    |_|

  Signoff - Approval Workflow and Notification Hub
  Version: {}
  Listening: {}
"#,
        env!("CARGO_PKG_VERSION"),
        config.server.listen_addr
    );

    // Create and run server
    let server = Server::new(config);
    server.run().await
}
