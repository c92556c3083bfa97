//! Publication gate shared between a producer task and its owner
//!
//! Producers run in spawned tasks, so aborting the task alone does not stop a
//! publication already in progress on another worker thread. Every publish
//! happens while holding the gate's lock, and `close` takes the same lock, so
//! once `close` returns nothing more is published.

use std::sync::{Arc, Mutex, MutexGuard};

/// Open/closed flag guarding a producer's output
#[derive(Debug, Clone)]
pub struct Gate {
    open: Arc<Mutex<bool>>,
}

impl Gate {
    /// Create an open gate
    pub fn new() -> Self {
        Self {
            open: Arc::new(Mutex::new(true)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        // A panic while publishing cannot leave the flag half-written
        self.open.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `publish` if the gate is still open; returns whether it ran
    pub fn publish<F: FnOnce()>(&self, publish: F) -> bool {
        let open = self.lock();
        if *open {
            publish();
            true
        } else {
            false
        }
    }

    /// Close the gate; returns `false` if it was already closed
    pub fn close(&self) -> bool {
        let mut open = self.lock();
        std::mem::replace(&mut *open, false)
    }

    /// Whether publications are still accepted
    pub fn is_open(&self) -> bool {
        *self.lock()
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_while_open() {
        let gate = Gate::new();
        let mut hits = 0;
        assert!(gate.publish(|| hits += 1));
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_close_blocks_publish() {
        let gate = Gate::new();
        let shared = gate.clone();

        assert!(gate.close());
        assert!(!gate.close());
        assert!(!shared.is_open());

        let mut hits = 0;
        assert!(!shared.publish(|| hits += 1));
        assert_eq!(hits, 0);
    }
}
