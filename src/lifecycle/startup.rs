//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server pool from configuration (initial probes start here)
//! - Start optional metrics and the health sweep
//! - Bind the listener and serve until asked to stop
//!
//! # Design Decisions
//! - Fail fast: a listener that cannot bind is fatal
//! - One shutdown broadcast stops both the health loop and the server

use std::future::Future;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::BalancerConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::load_balancer::pool::ServerPool;
use crate::observability::metrics;

/// Errors that abort the process.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid metrics address {address:?}: {source}")]
    MetricsAddress {
        address: String,
        source: AddrParseError,
    },

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the balancer until SIGINT or SIGTERM.
pub async fn run(config: BalancerConfig) -> Result<(), StartupError> {
    run_until(config, signals::shutdown_signal()).await
}

/// Run the balancer until `stop` resolves.
pub async fn run_until<F>(config: BalancerConfig, stop: F) -> Result<(), StartupError>
where
    F: Future<Output = ()>,
{
    tracing::info!(
        count = config.backends.len(),
        backends = ?config.backends,
        "Adding backends"
    );
    let pool = Arc::new(ServerPool::from_config(&config));

    if config.observability.metrics_enabled {
        let address = &config.observability.metrics_address;
        let addr: SocketAddr = address.parse().map_err(|source| StartupError::MetricsAddress {
            address: address.clone(),
            source,
        })?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let health = pool.start_health_loop(shutdown.subscribe());
    let server = HttpServer::new(pool).run(listener, shutdown.subscribe());
    tokio::pin!(server);

    tracing::info!(address = %config.listener.bind_address, "Starting load balancer");

    let result = tokio::select! {
        res = &mut server => res,
        _ = stop => {
            shutdown.trigger();
            server.await
        }
    };

    shutdown.trigger();
    if let Err(e) = health.await {
        tracing::warn!(error = %e, "Health monitor task ended abnormally");
    }

    result.map_err(StartupError::Serve)
}
