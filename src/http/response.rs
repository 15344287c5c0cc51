//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the backend response to the client
//! - Strip hop-by-hop headers
//! - Map balancer-side failures to HTTP status codes
//!
//! # Design Decisions
//! - Streaming responses avoid buffering the entire body
//! - No live backend results in 503 Service Unavailable
//! - Backend transport failures result in 502 Bad Gateway

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use hyper::body::Incoming;

use crate::http::headers::remove_hop_by_hop_headers;

/// Body sent when no backend is alive.
pub const NO_BACKEND_BODY: &str = "Service not available";

/// Body sent when the chosen backend could not be reached.
pub const BAD_GATEWAY_BODY: &str = "Bad Gateway";

/// Turn an upstream response into the client response.
pub fn relay(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    remove_hop_by_hop_headers(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

/// `503` for when the pool has no live peer.
pub fn service_unavailable() -> Response<Body> {
    (StatusCode::SERVICE_UNAVAILABLE, NO_BACKEND_BODY).into_response()
}

/// `502` for upstream transport failures.
pub fn bad_gateway() -> Response<Body> {
    (StatusCode::BAD_GATEWAY, BAD_GATEWAY_BODY).into_response()
}
