//! Proposals and their conviction snapshots.

use crate::error::GovernanceError;
use crate::params::ProposalParams;
use conviction_math::{accumulate, drift, peak_conviction, RampPolicy};
use conviction_types::{AccountId, Fixed, SignedFixed, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sequential proposal number, unique within one resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProposalId(u64);

impl ProposalId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Accepting votes and accumulating conviction.
    Active,
    /// Crossed its required conviction. Terminal.
    Passed,
}

/// A proposal and the last snapshot of its conviction trajectory.
///
/// Conviction is only materialized at sync points. Between two syncs the
/// aggregate weight drifts linearly by `aggregate_flow` per step, so the
/// snapshot plus the elapsed step count fully determines the current value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub owner: AccountId,
    pub params: ProposalParams,
    pub status: ProposalStatus,
    /// Sum of voter weights at `last_synced_step`. Not clamped, so it stays
    /// the exact sum of the recorded votes.
    pub aggregate_weight: SignedFixed,
    /// Sum of voter weight changes per step.
    pub aggregate_flow: SignedFixed,
    pub last_conviction: Fixed,
    /// Steps since `created_at` covered by `last_conviction`.
    pub last_synced_step: u64,
    pub created_at: Timestamp,
    /// Opaque to the ledger; interpreted by whoever executes passed proposals.
    pub payload: Vec<u8>,
    pub passed_at: Option<Timestamp>,
}

/// The stretch of trajectory covered by one sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncWindow {
    pub start_conviction: Fixed,
    pub start_weight: SignedFixed,
    pub flow: SignedFixed,
    pub steps: u64,
}

impl SyncWindow {
    /// Highest conviction anywhere in the window, endpoints included.
    pub fn peak(&self, alpha: Fixed, policy: RampPolicy) -> Result<Fixed, GovernanceError> {
        let peak = peak_conviction(
            self.start_conviction,
            self.start_weight,
            self.flow,
            alpha,
            self.steps,
            policy,
        )?;
        Ok(peak.conviction)
    }
}

impl Proposal {
    pub fn is_active(&self) -> bool {
        self.status == ProposalStatus::Active
    }

    /// Whole steps between creation and `now`.
    pub fn step_at(&self, now: Timestamp) -> Result<u64, GovernanceError> {
        if now < self.created_at {
            return Err(GovernanceError::InvalidParameter(format!(
                "time {} precedes creation of proposal {} at {}",
                now, self.id, self.created_at
            )));
        }
        Ok(self
            .created_at
            .steps_until(now, self.params.step_duration_secs))
    }

    /// Time at which `step` begins.
    pub fn step_start(&self, step: u64) -> Timestamp {
        self.created_at
            .saturating_add_secs(step.saturating_mul(u64::from(self.params.step_duration_secs)))
    }

    /// Advance the snapshot to the step containing `now` with the current
    /// aggregates. Never evaluates or changes the status.
    pub fn sync_to(
        &mut self,
        now: Timestamp,
        policy: RampPolicy,
    ) -> Result<SyncWindow, GovernanceError> {
        let step = self.step_at(now)?;
        if step < self.last_synced_step {
            return Err(GovernanceError::InvalidParameter(format!(
                "proposal {} already synced to step {}, cannot rewind to {}",
                self.id, self.last_synced_step, step
            )));
        }

        let window = SyncWindow {
            start_conviction: self.last_conviction,
            start_weight: self.aggregate_weight,
            flow: self.aggregate_flow,
            steps: step - self.last_synced_step,
        };
        if window.steps == 0 {
            return Ok(window);
        }

        let conviction = accumulate(
            window.start_conviction,
            window.start_weight,
            window.flow,
            self.params.alpha,
            window.steps,
            policy,
        )?;
        let weight = drift(window.start_weight, window.flow, window.steps)?;

        self.last_conviction = conviction;
        self.aggregate_weight = weight;
        self.last_synced_step = step;
        Ok(window)
    }

    /// Swap one voter's contribution for another at the current snapshot.
    pub fn replace_contribution(
        &mut self,
        old: (SignedFixed, SignedFixed),
        new: (SignedFixed, SignedFixed),
    ) -> Result<(), GovernanceError> {
        let overflow = || GovernanceError::Math(conviction_math::MathError::Overflow);
        self.aggregate_weight = self
            .aggregate_weight
            .checked_sub(old.0)
            .and_then(|w| w.checked_add(new.0))
            .ok_or_else(overflow)?;
        self.aggregate_flow = self
            .aggregate_flow
            .checked_sub(old.1)
            .and_then(|f| f.checked_add(new.1))
            .ok_or_else(overflow)?;
        Ok(())
    }
}

/// All proposals of one resource, keyed by sequential id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalStore {
    proposals: BTreeMap<ProposalId, Proposal>,
    next_id: u64,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new Active proposal with empty aggregates.
    pub fn create(
        &mut self,
        owner: AccountId,
        params: ProposalParams,
        payload: Vec<u8>,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        params.validate()?;
        let id = ProposalId::new(self.next_id);
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| GovernanceError::InvalidParameter("proposal ids exhausted".into()))?;

        self.proposals.insert(
            id,
            Proposal {
                id,
                owner,
                params,
                status: ProposalStatus::Active,
                aggregate_weight: SignedFixed::ZERO,
                aggregate_flow: SignedFixed::ZERO,
                last_conviction: Fixed::ZERO,
                last_synced_step: 0,
                created_at: now,
                payload,
                passed_at: None,
            },
        );
        self.next_id = next_id;
        Ok(id)
    }

    pub fn get(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&id)
            .ok_or_else(|| GovernanceError::ProposalNotFound(id.to_string()))
    }

    /// Replace a stored proposal with an updated copy.
    pub fn put(&mut self, proposal: Proposal) {
        self.proposals.insert(proposal.id, proposal);
    }

    pub fn ids(&self) -> Vec<ProposalId> {
        self.proposals.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}
