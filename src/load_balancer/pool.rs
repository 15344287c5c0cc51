//! Backend pool management.
//!
//! # Responsibilities
//! - Own the ordered list of backends built from configuration
//! - Select the next live backend in round-robin order
//! - Schedule health probes at registration and on every sweep

use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::BalancerConfig;
use crate::health::active::{HealthMonitor, Prober};
use crate::http::forward::{build_client, HttpClient};
use crate::load_balancer::{
    backend::{parse_backend_url, Backend, SharedBackend},
    round_robin::RoundRobin,
};

/// The ordered set of backends requests are balanced across.
#[derive(Debug)]
pub struct ServerPool {
    backends: Vec<SharedBackend>,
    balancer: RoundRobin,
    client: HttpClient,
    prober: Prober,
    interval: Duration,
}

impl ServerPool {
    /// Create an empty pool that probes with `prober` every `interval`.
    pub fn new(prober: Prober, interval: Duration) -> Self {
        Self {
            backends: Vec::new(),
            balancer: RoundRobin::new(),
            client: build_client(),
            prober,
            interval,
        }
    }

    /// Build a pool from configuration and register its backends.
    pub fn from_config(config: &BalancerConfig) -> Self {
        let mut pool = Self::new(
            Prober::from_config(&config.health_check),
            Duration::from_secs(config.health_check.interval_secs),
        );
        pool.add_backends(&config.backends);
        pool
    }

    /// Register backends in order, skipping URLs that do not parse.
    ///
    /// Each accepted backend gets an initial probe spawned on the current
    /// runtime. Outside a runtime the first sweep does the first probe.
    pub fn add_backends<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let runtime = Handle::try_current().ok();

        for raw in urls {
            let raw = raw.as_ref();
            let url = match parse_backend_url(raw) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(url = %raw, error = %e, "Skipping invalid backend URL");
                    continue;
                }
            };

            let backend = Arc::new(Backend::new(url, self.client.clone()));
            self.backends.push(Arc::clone(&backend));
            tracing::info!(backend = %backend.url, index = self.backends.len() - 1, "Backend registered");

            match &runtime {
                Some(handle) => {
                    let prober = self.prober.clone();
                    handle.spawn(async move {
                        prober.probe(&backend).await;
                    });
                }
                None => {
                    tracing::debug!(backend = %backend.url, "No runtime, first probe deferred to health loop");
                }
            }
        }
    }

    /// Number of registered backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// All backends in round-robin order.
    pub fn backends(&self) -> &[SharedBackend] {
        &self.backends
    }

    /// Advance the shared cursor and reduce it modulo the pool size.
    pub fn next_index(&self) -> usize {
        self.balancer.next_index(self.backends.len())
    }

    /// Select the next alive backend, or `None` if every backend is dead.
    pub fn get_next_peer(&self) -> Option<SharedBackend> {
        self.balancer.next_server(&self.backends)
    }

    /// Spawn one probe per backend without waiting for any of them.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn probe_all(&self) {
        for backend in &self.backends {
            let backend = Arc::clone(backend);
            let prober = self.prober.clone();
            tokio::spawn(async move {
                prober.probe(&backend).await;
            });
        }
    }

    /// Start the periodic health sweep; it stops when `shutdown` fires.
    pub fn start_health_loop(self: &Arc<Self>, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let monitor = HealthMonitor::new(Arc::clone(self), self.interval);
        tokio::spawn(monitor.run(shutdown))
    }
}
