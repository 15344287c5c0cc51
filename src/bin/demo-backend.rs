//! Minimal backend for trying the balancer by hand.
//!
//! `PORT=8001 cargo run --bin demo-backend`

use axum::{routing::any, Router};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port: u16 = std::env::var("PORT")
        .ok()
        .map(|p| p.parse())
        .transpose()?
        .unwrap_or(8000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("demo backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app()).await?;
    Ok(())
}

/// `/health` answers 200 for every method; everything else says hello.
fn app() -> Router {
    Router::new()
        .route("/health", any(|| async {}))
        .fallback(|| async { "Hello World\n" })
}
