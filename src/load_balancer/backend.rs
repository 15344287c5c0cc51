//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Track liveness as reported by the most recent probe
//! - Forward requests through a proxy bound to the backend URL

use axum::body::Body;
use axum::http::{Request, Response};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::http::forward::{HttpClient, ReverseProxy};

/// Why a backend URL was rejected at registration.
#[derive(Debug, Error)]
pub enum BackendUrlError {
    #[error("invalid URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,
}

/// Parse a backend base URL, accepting absolute `http://` and `https://` URLs.
pub fn parse_backend_url(raw: &str) -> Result<Url, BackendUrlError> {
    let url = Url::parse(raw)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(BackendUrlError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host().is_none() {
        return Err(BackendUrlError::MissingHost);
    }
    Ok(url)
}

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// Base URL of the backend.
    pub url: Url,
    /// Liveness from the last completed probe.
    alive: AtomicBool,
    proxy: ReverseProxy,
}

impl Backend {
    /// Create a backend that is not alive until its first probe passes.
    pub fn new(url: Url, client: HttpClient) -> Self {
        Self {
            proxy: ReverseProxy::new(url.clone(), client),
            url,
            alive: AtomicBool::new(false),
        }
    }

    /// Return true if the last probe passed.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Update liveness, returning the previous value.
    pub fn set_alive(&self, alive: bool) -> bool {
        self.alive.swap(alive, Ordering::AcqRel)
    }

    /// Forward a request to this backend.
    pub async fn forward(&self, request: Request<Body>) -> Response<Body> {
        self.proxy.forward(request).await
    }
}

/// A thread-safe reference to a Backend.
pub type SharedBackend = Arc<Backend>;
