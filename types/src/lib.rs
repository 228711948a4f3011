//! Fundamental types for the conviction voting ledger.
//!
//! This crate defines the types shared across every other crate in the
//! workspace: fixed-point scalars, identifiers, timestamps, and the read-only
//! view of the external account ledger.

pub mod account;
pub mod error;
pub mod fixed;
pub mod state;
pub mod time;

pub use account::{AccountId, ResourceId};
pub use error::ParseFixedError;
pub use fixed::{Fixed, SignedFixed, DECIMALS, DENOMINATOR};
pub use state::{AccountState, AccountStateSource};
pub use time::Timestamp;
