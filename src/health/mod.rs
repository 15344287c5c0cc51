//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Backend registered → one probe spawned immediately
//!
//! Periodic timer (active.rs)
//!     → one spawned probe per backend
//!     → GET <backend>/health with timeout
//!     → 200 ⇒ alive, anything else ⇒ dead
//! ```
//!
//! # Design Decisions
//! - A single probe decides liveness, no thresholds
//! - Health state is per-backend, not per-pool
//! - Probes are fire-and-forget; routing never waits on them

pub mod active;

pub use active::{HealthMonitor, Prober};
