//! Conviction-weighted governance.
//!
//! Proposals accumulate conviction, an exponentially decayed sum of the
//! voting weight allocated to them, and pass once it crosses a threshold.
//! Weight derives from voters' holdings in an external account ledger, which
//! may stream continuously; the engine keeps every proposal's trajectory in
//! closed form and only materializes it when a vote, an evaluation or a
//! balance change touches the proposal.
//!
//! Key invariants:
//! - a voter never commits more than 100% of their holdings across a resource
//! - `Passed` is terminal and only [`ConvictionEngine::sync_and_evaluate`]
//!   sets it
//! - snapshots only move forward in time

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod hook;
pub mod index;
pub mod ledger;
pub mod logging;
pub mod params;
pub mod proposal;
pub mod snapshot;
pub mod vote;

pub use config::ConvictionConfig;
pub use engine::ConvictionEngine;
pub use error::GovernanceError;
pub use event::{ConvictionEvent, EventBus, Listener};
pub use index::{UserVotingIndex, VoterAllocations};
pub use ledger::ResourceLedger;
pub use logging::{init_logging, LogFormat};
pub use params::ProposalParams;
pub use proposal::{Proposal, ProposalId, ProposalStatus, ProposalStore, SyncWindow};
pub use vote::{voter_contribution, Vote, VoteLedger};
