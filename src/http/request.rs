//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for requests that lack one
//! - Rewrite the request URI onto the chosen backend
//! - Prepare request headers for forwarding to the backend
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing and forwarded upstream
//! - Original `Host` header preserved
//! - Upstream requests always use HTTP/1.1

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::uri::InvalidUri;
use axum::http::{HeaderMap, HeaderValue, Request, Uri, Version};
use std::net::SocketAddr;
use tower_http::request_id::{MakeRequestId, RequestId};
use url::{Position, Url};
use uuid::Uuid;

use crate::http::headers::{append_forwarded_for, remove_hop_by_hop_headers};

/// Request ID header name.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a fresh UUID v4 request ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID header, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Join two URL paths with exactly one slash between them.
pub fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Build the absolute URI a request for `original` should be sent to on `target`.
pub fn upstream_uri(target: &Url, original: &Uri) -> Result<Uri, InvalidUri> {
    let path = join_paths(target.path(), original.path());

    let target_query = target.query().filter(|q| !q.is_empty());
    let request_query = original.query().filter(|q| !q.is_empty());
    let query = match (target_query, request_query) {
        (Some(t), Some(r)) => format!("?{}&{}", t, r),
        (Some(q), None) | (None, Some(q)) => format!("?{}", q),
        (None, None) => String::new(),
    };

    let authority = &target[Position::BeforeHost..Position::AfterPort];
    format!("{}://{}{}{}", target.scheme(), authority, path, query).parse()
}

/// Rewrite an inbound request so it can be sent to `target`.
pub fn prepare_upstream_request(
    request: Request<Body>,
    target: &Url,
) -> Result<Request<Body>, InvalidUri> {
    let (mut parts, body) = request.into_parts();

    parts.uri = upstream_uri(target, &parts.uri)?;
    parts.version = Version::HTTP_11;

    remove_hop_by_hop_headers(&mut parts.headers);
    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        append_forwarded_for(&mut parts.headers, addr.ip());
    }

    Ok(Request::from_parts(parts, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::X_FORWARDED_FOR;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn join_paths_uses_single_slash() {
        assert_eq!(join_paths("/", "/users"), "/users");
        assert_eq!(join_paths("/api/", "/users"), "/api/users");
        assert_eq!(join_paths("/api", "users"), "/api/users");
        assert_eq!(join_paths("/api", "/users"), "/api/users");
    }

    #[test]
    fn rewrites_onto_backend_authority() {
        let uri: Uri = "/items/7?full=1".parse().unwrap();
        let rewritten = upstream_uri(&url("http://127.0.0.1:8000"), &uri).unwrap();
        assert_eq!(rewritten.to_string(), "http://127.0.0.1:8000/items/7?full=1");
    }

    #[test]
    fn keeps_backend_base_path_and_merges_queries() {
        let uri: Uri = "/items?page=2".parse().unwrap();
        let rewritten = upstream_uri(&url("http://svc.local:9000/v1?tenant=a"), &uri).unwrap();
        assert_eq!(rewritten.to_string(), "http://svc.local:9000/v1/items?tenant=a&page=2");
    }

    #[test]
    fn keeps_https_scheme() {
        let uri: Uri = "/login".parse().unwrap();
        let rewritten = upstream_uri(&url("https://api.example.com"), &uri).unwrap();
        assert_eq!(rewritten.to_string(), "https://api.example.com/login");
    }

    #[test]
    fn ignores_backend_credentials() {
        let uri: Uri = "/".parse().unwrap();
        let rewritten = upstream_uri(&url("http://user:pw@[::1]:8000"), &uri).unwrap();
        assert_eq!(rewritten.to_string(), "http://[::1]:8000/");
    }

    #[test]
    fn prepared_request_carries_forwarding_headers() {
        let mut request = Request::builder()
            .method("POST")
            .uri("/submit")
            .header("host", "lb.example.com")
            .header("connection", "close")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo("203.0.113.9:51000".parse::<SocketAddr>().unwrap()));

        let prepared = prepare_upstream_request(request, &url("http://10.1.1.1:8000")).unwrap();

        assert_eq!(prepared.uri().to_string(), "http://10.1.1.1:8000/submit");
        assert_eq!(prepared.method(), "POST");
        assert_eq!(prepared.version(), Version::HTTP_11);
        assert_eq!(prepared.headers()["host"], "lb.example.com");
        assert_eq!(prepared.headers()[X_FORWARDED_FOR], "203.0.113.9");
        assert!(prepared.headers().get("connection").is_none());
    }

    #[test]
    fn request_id_defaults_to_unknown() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }
}
