//! Timestamp type used throughout the ledger.
//!
//! Timestamps are Unix epoch seconds supplied by the host. The core never
//! reads a wall clock itself, so every operation is replayable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Whole steps of `step_secs` elapsed since this timestamp.
    ///
    /// Partial steps are truncated. Returns 0 for a zero step length.
    pub fn steps_until(&self, now: Timestamp, step_secs: u32) -> u64 {
        if step_secs == 0 {
            return 0;
        }
        self.elapsed_since(now) / u64::from(step_secs)
    }

    pub fn saturating_add_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
