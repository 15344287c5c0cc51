//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Request arrives
//!     → pool.rs (ordered backends, shared cursor)
//!     → round_robin.rs (advance cursor, scan forward for first alive)
//!     → backend.rs (forward through bound proxy)
//!     → Return response, or None when nothing is alive
//! ```
//!
//! # Design Decisions
//! - Backend list is fixed once the pool is shared; no locking to iterate
//! - Liveness is one atomic flag per backend, never a pool-wide lock
//! - Cursor is a single atomic counter

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::{Backend, SharedBackend};
pub use pool::ServerPool;
