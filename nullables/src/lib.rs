//! Nullable infrastructure for deterministic testing.
//!
//! The conviction core never reads a wall clock and never writes to the
//! account ledger; it only queries holdings. This crate provides
//! test-friendly stand-ins for both that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network

pub mod account_ledger;
pub mod clock;

pub use account_ledger::NullAccountLedger;
pub use clock::NullClock;
