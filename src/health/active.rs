//! Active health checking.
//!
//! # Responsibilities
//! - Probe a backend's health endpoint with a bounded timeout
//! - Follow up to ten redirects and judge the final response
//! - Update backend liveness from the probe outcome
//! - Periodically fan out one probe per backend until shutdown

use axum::body::Body;
use axum::http::uri::InvalidUri;
use axum::http::{header, HeaderValue, Method, Request, StatusCode, Uri};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};
use url::Url;

use crate::config::HealthCheckConfig;
use crate::http::forward::{build_client, HttpClient};
use crate::http::request::upstream_uri;
use crate::load_balancer::backend::Backend;
use crate::load_balancer::pool::ServerPool;
use crate::observability::metrics;

const PROBE_USER_AGENT: &str = "rr-balancer-health-check";

/// Redirects followed before a probe gives up.
const MAX_REDIRECTS: usize = 10;

/// Why a probe counted as a failure.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("invalid health check URI: {0}")]
    InvalidUri(#[from] InvalidUri),

    #[error("failed to build health check request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("connection error: {0}")]
    Connect(#[from] hyper_util::client::legacy::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("redirect to unusable location {0:?}")]
    InvalidRedirect(String),

    #[error("stopped after {0} redirects")]
    TooManyRedirects(usize),
}

/// Issues health probes against backends.
#[derive(Debug, Clone)]
pub struct Prober {
    client: HttpClient,
    timeout: Duration,
    path: String,
}

impl Prober {
    pub fn new(timeout: Duration, path: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            timeout,
            path: path.into(),
        }
    }

    pub fn from_config(config: &HealthCheckConfig) -> Self {
        Self::new(Duration::from_secs(config.timeout_secs), config.path.clone())
    }

    /// The URI probed for `backend`: the health path joined onto its base URL.
    pub fn health_uri(&self, backend: &Backend) -> Result<Uri, InvalidUri> {
        let path: Uri = self.path.parse()?;
        upstream_uri(&backend.url, &path)
    }

    /// Probe `backend` once and record the result as its liveness.
    pub async fn probe(&self, backend: &Backend) -> bool {
        let alive = match self.check(backend).await {
            Ok(()) => {
                tracing::info!(backend = %backend.url, "Health check passed");
                true
            }
            Err(e) => {
                tracing::warn!(backend = %backend.url, error = %e, "Health check failed");
                false
            }
        };

        let was_alive = backend.set_alive(alive);
        if was_alive != alive {
            tracing::info!(
                backend = %backend.url,
                from = was_alive,
                to = alive,
                "Backend liveness changed"
            );
        }

        metrics::record_backend_health(backend.url.as_str(), alive);
        alive
    }

    async fn check(&self, backend: &Backend) -> Result<(), ProbeFailure> {
        let uri = self.health_uri(backend)?;

        // The timeout covers the whole redirect chain.
        let status = time::timeout(self.timeout, self.final_status(uri))
            .await
            .map_err(|_| ProbeFailure::Timeout(self.timeout))??;

        match status {
            StatusCode::OK => Ok(()),
            status => Err(ProbeFailure::Status(status)),
        }
    }

    /// GET `uri`, following redirects, and return the last status seen.
    async fn final_status(&self, mut uri: Uri) -> Result<StatusCode, ProbeFailure> {
        for _ in 0..=MAX_REDIRECTS {
            let request = Request::builder()
                .method(Method::GET)
                .uri(uri.clone())
                .header(header::USER_AGENT, PROBE_USER_AGENT)
                .body(Body::empty())?;

            let response = self.client.request(request).await?;
            let status = response.status();
            if !is_followed_redirect(status) {
                return Ok(status);
            }

            let Some(location) = response.headers().get(header::LOCATION) else {
                return Ok(status);
            };
            let next = resolve_location(&uri, location)?;
            tracing::debug!(from = %uri, to = %next, status = %status, "Following health check redirect");
            uri = next;
        }

        Err(ProbeFailure::TooManyRedirects(MAX_REDIRECTS))
    }
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Resolve a `Location` header against the URI that produced it.
fn resolve_location(base: &Uri, location: &HeaderValue) -> Result<Uri, ProbeFailure> {
    let invalid = || ProbeFailure::InvalidRedirect(String::from_utf8_lossy(location.as_bytes()).into_owned());

    let location = location.to_str().map_err(|_| invalid())?;
    let base = Url::parse(&base.to_string()).map_err(|_| invalid())?;
    let next = base.join(location).map_err(|_| invalid())?;
    if !matches!(next.scheme(), "http" | "https") {
        return Err(invalid());
    }
    next.as_str().parse().map_err(|_| invalid())
}

/// Periodic sweep over every backend in a pool.
pub struct HealthMonitor {
    pool: Arc<ServerPool>,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(pool: Arc<ServerPool>, interval: Duration) -> Self {
        Self { pool, interval }
    }

    /// Tick until `shutdown` fires. The first sweep runs one interval after start.
    ///
    /// Probes are spawned and never awaited, so a slow backend cannot delay the
    /// next tick, and probes still in flight at shutdown run to completion.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = ?self.interval,
            backends = self.pool.len(),
            "Health monitor starting"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.pool.probe_all();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
