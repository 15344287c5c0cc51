//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → ServerPool (initial probes) → metrics → bind → health loop → serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → health loop stops ticking → server drains → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Listener binds before the health loop starts ticking
//! - In-flight probes are never cancelled

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
