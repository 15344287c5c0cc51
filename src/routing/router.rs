//! Request dispatch.
//!
//! # Responsibilities
//! - Ask the pool for the next live backend
//! - Forward the request to it, or answer 503 when none is alive
//!
//! # Design Decisions
//! - No retry and no second peer: a failed forward is final for that request
//! - The backend response is passed through as-is

use axum::body::Body;
use axum::http::{Request, Response};
use std::time::Instant;

use crate::http::request::request_id;
use crate::http::response::service_unavailable;
use crate::load_balancer::pool::ServerPool;
use crate::observability::metrics;

/// Route one request through the pool.
pub async fn route(pool: &ServerPool, request: Request<Body>) -> Response<Body> {
    let start_time = Instant::now();

    let Some(peer) = pool.get_next_peer() else {
        tracing::warn!(
            request_id = %request_id(request.headers()),
            path = %request.uri().path(),
            method = %request.method(),
            "No backends available"
        );
        metrics::record_no_backend();
        return service_unavailable();
    };

    tracing::info!(
        request_id = %request_id(request.headers()),
        backend = %peer.url,
        path = %request.uri().path(),
        method = %request.method(),
        "Routing request"
    );

    let response = peer.forward(request).await;
    metrics::record_request(peer.url.as_str(), response.status().as_u16(), start_time);
    response
}
