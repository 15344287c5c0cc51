//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (any method, any path)
//!     → router.rs (ask pool for next live peer)
//!     → peer found: forward via backend proxy
//!     → no peer: 503 Service Unavailable
//! ```
//!
//! # Design Decisions
//! - No path-based rules; every request is balanced
//! - Deterministic given pool state: selection order is round-robin
//! - Terminal on forward failure (no retry, no failover)

pub mod router;

pub use router::route;
