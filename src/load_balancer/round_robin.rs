//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use crate::load_balancer::backend::Backend;

/// Round-robin selector.
/// Stores a shared cursor to rotate through backends, skipping dead ones.
#[derive(Debug, Default)]
pub struct RoundRobin {
    current: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn starting_at(position: usize) -> Self {
        Self {
            current: AtomicUsize::new(position),
        }
    }

    /// Advance the cursor and reduce it modulo `len` (0 when `len` is 0).
    pub fn next_index(&self, len: usize) -> usize {
        let next = self.current.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        next.checked_rem(len).unwrap_or(0)
    }

    /// Pick the first alive backend at or after the next cursor position.
    ///
    /// The index of the chosen backend is written back into the cursor so the
    /// following call resumes just after it.
    pub fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        let len = backends.len();
        if len == 0 {
            return None;
        }

        let start = self.next_index(len);
        for i in start..start + len {
            let index = i % len;
            let backend = &backends[index];
            if backend.is_alive() {
                self.current.store(index, Ordering::Relaxed);
                return Some(Arc::clone(backend));
            }
        }
        None
    }
}
