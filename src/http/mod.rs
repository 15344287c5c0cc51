//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → [routing picks a live backend]
//!     → request.rs (rewrite URI and headers for the backend)
//!     → forward.rs (send with pooled client)
//!     → response.rs (strip hop-by-hop headers, map failures)
//!     → Send to client
//! ```

pub mod forward;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use forward::ReverseProxy;
pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::HttpServer;
