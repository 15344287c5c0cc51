//! Round-robin HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 LOAD BALANCER                 │
//!   Client Request      │  ┌────────┐   ┌─────────┐   ┌──────────────┐  │
//!   ────────────────────┼─▶│  http  │──▶│ routing │──▶│ server pool  │  │
//!                       │  │ server │   │  route  │   │ round robin  │  │
//!                       │  └────────┘   └─────────┘   └──────┬───────┘  │
//!                       │                                     ▼          │
//!   Client Response     │                             ┌──────────────┐  │
//!   ◀───────────────────┼─────────────────────────────│   backend    │◀─┼── Backend
//!                       │                             │   forward    │  │   Server
//!                       │                             └──────────────┘  │
//!                       │  ┌──────────────┐   periodic GET /health       │
//!                       │  │ health loop  │─────────────────────────────┼──▶ Backends
//!                       │  └──────────────┘                              │
//!                       └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use rr_balancer::config::{resolve_config, BalancerConfig, ConfigError, Overrides};
use rr_balancer::lifecycle::startup;
use rr_balancer::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "rr-balancer")]
#[command(about = "Round-robin HTTP load balancer with active health checks", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL; repeat to list several. Replaces configured backends.
    #[arg(short, long = "backend")]
    backends: Vec<String>,

    /// Listen address, e.g. 0.0.0.0:8080.
    #[arg(long)]
    bind: Option<String>,
}

impl Cli {
    fn resolve_config(self) -> Result<BalancerConfig, ConfigError> {
        let overrides = Overrides {
            backends: self.backends,
            bind_address: self.bind,
        };
        resolve_config(self.config.as_deref(), overrides)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Cli::parse().resolve_config();

    let level = config
        .as_ref()
        .map(|c| c.observability.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&level);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("rr-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    match startup::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to start");
            ExitCode::FAILURE
        }
    }
}
