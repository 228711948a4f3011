//! Nullable clock: deterministic time for testing.

use conviction_types::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to. Shareable across threads so a
/// test can hand the same clock to several collaborators.
#[derive(Debug, Default)]
pub struct NullClock {
    current: AtomicU64,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: AtomicU64::new(initial_secs),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.load(Ordering::SeqCst))
    }

    /// Advance time by a number of seconds and return the new time.
    pub fn advance(&self, secs: u64) -> Timestamp {
        Timestamp::new(self.current.fetch_add(secs, Ordering::SeqCst) + secs)
    }

    /// Advance by whole steps of `step_secs` each.
    pub fn advance_steps(&self, step_secs: u32, steps: u64) -> Timestamp {
        self.advance(u64::from(step_secs) * steps)
    }

    pub fn set(&self, secs: u64) {
        self.current.store(secs, Ordering::SeqCst);
    }
}
