//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::http::StatusCode;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use rr_balancer::health::Prober;
use rr_balancer::{HttpServer, ServerPool, Shutdown};

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the request line (e.g. `GET /health HTTP/1.1`) and returns
/// the status and body to send back.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request_line) = read_request_line(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(request_line).await;
                        let reason = StatusCode::from_u16(status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("Unknown");

                        let response_str = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that is healthy and answers every other path with `name`.
pub async fn start_named_backend(name: &'static str) -> SocketAddr {
    start_programmable_backend(move |line| async move {
        if is_health_probe(&line) {
            (200, String::new())
        } else {
            (200, name.to_string())
        }
    })
    .await
}

pub fn is_health_probe(request_line: &str) -> bool {
    request_line.starts_with("GET /health ")
}

/// Read the request head and return its first line.
async fn read_request_line(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    head.lines().next().map(str::to_string)
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn new_pool(probe_timeout: Duration, interval: Duration) -> ServerPool {
    ServerPool::new(Prober::new(probe_timeout, "/health"), interval)
}

/// Build a pool on a thread without a runtime, so no initial probe runs and
/// every backend starts dead.
pub fn pool_without_probes(urls: Vec<String>) -> ServerPool {
    sweeping_pool_without_probes(urls, Duration::from_secs(60))
}

/// Like [`pool_without_probes`], with a custom sweep interval.
pub fn sweeping_pool_without_probes(urls: Vec<String>, interval: Duration) -> ServerPool {
    std::thread::spawn(move || {
        let mut pool = new_pool(Duration::from_secs(1), interval);
        pool.add_backends(urls);
        pool
    })
    .join()
    .unwrap()
}

/// Serve `pool` on an ephemeral port until the returned `Shutdown` fires.
pub async fn start_balancer(pool: Arc<ServerPool>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = HttpServer::new(pool).run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Poll `cond` every 20ms until it holds or `timeout` passes.
pub async fn wait_until<F: Fn() -> bool>(cond: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
