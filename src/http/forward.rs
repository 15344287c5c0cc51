//! Single-host reverse proxy used by every backend.

use axum::body::Body;
use axum::http::{Request, Response};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::http::request::prepare_upstream_request;
use crate::http::response::{bad_gateway, relay};

/// Pooled HTTP/1.1 client shared by all forwarding proxies and probes.
///
/// Speaks plain HTTP or TLS depending on the URI scheme.
pub type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build a client suitable for sharing across backends.
pub fn build_client() -> HttpClient {
    let https = HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();

    Client::builder(TokioExecutor::new()).build(https)
}

/// Forwards requests to one fixed backend URL.
#[derive(Debug, Clone)]
pub struct ReverseProxy {
    target: Url,
    client: HttpClient,
}

impl ReverseProxy {
    /// Bind a proxy to `target`, sending through `client`.
    pub fn new(target: Url, client: HttpClient) -> Self {
        Self { target, client }
    }

    /// Send `request` to the backend and relay whatever comes back.
    ///
    /// Transport failures become `502 Bad Gateway`; nothing is retried.
    pub async fn forward(&self, request: Request<Body>) -> Response<Body> {
        let request = match prepare_upstream_request(request, &self.target) {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(backend = %self.target, error = %e, "Failed to build upstream request");
                return bad_gateway();
            }
        };

        match self.client.request(request).await {
            Ok(response) => relay(response),
            Err(e) => {
                tracing::error!(backend = %self.target, error = %e, "Upstream request failed");
                bad_gateway()
            }
        }
    }
}
