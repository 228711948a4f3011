//! Per-voter allocation records.

use crate::error::GovernanceError;
use crate::params::ProposalParams;
use crate::proposal::ProposalId;
use conviction_math::{drift, mul_div, MathError};
use conviction_types::{AccountId, AccountState, Fixed, SignedFixed, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One voter's stake in one proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Share of the voter's holdings committed, in `(0, 1]`.
    pub percentage: Fixed,
    /// Weight contributed at `synced_step`.
    pub weight: SignedFixed,
    /// Weight change per step.
    pub flow: SignedFixed,
    /// Proposal step at which `weight` was recorded.
    pub synced_step: u64,
}

impl Vote {
    /// This vote's contribution to the aggregates at `step`.
    pub fn contribution_at(&self, step: u64) -> Result<(SignedFixed, SignedFixed), MathError> {
        let elapsed = step.saturating_sub(self.synced_step);
        Ok((drift(self.weight, self.flow, elapsed)?, self.flow))
    }
}

/// Weight at the step boundary `at` and per-step flow that committing
/// `percentage` of `state` confers.
///
/// The balance is projected to `at` with the current rate even when the
/// ledger settled it later in the step, so the recorded weight plus `n`
/// flows matches the holdings at every following boundary. An account that
/// is empty at `at` and not receiving contributes nothing.
pub fn voter_contribution(
    state: &AccountState,
    at: Timestamp,
    percentage: Fixed,
    params: &ProposalParams,
) -> Result<(SignedFixed, SignedFixed), MathError> {
    let balance = state.projected_balance(at);
    if balance <= 0 && state.flow_rate <= 0 {
        return Ok((SignedFixed::ZERO, SignedFixed::ZERO));
    }

    let scale = u128::from(params.weight_scaling_factor);
    let weight = i128::try_from(mul_div(balance.unsigned_abs(), percentage.raw(), scale)?)
        .map_err(|_| MathError::Overflow)?;
    let weight = if balance < 0 { -weight } else { weight };

    let per_step = state
        .flow_rate
        .unsigned_abs()
        .checked_mul(u128::from(params.step_duration_secs))
        .ok_or(MathError::Overflow)?;
    let flow = i128::try_from(mul_div(per_step, percentage.raw(), scale)?)
        .map_err(|_| MathError::Overflow)?;
    let flow = if state.flow_rate < 0 { -flow } else { flow };
    Ok((SignedFixed::from_raw(weight), SignedFixed::from_raw(flow)))
}

/// Votes of one resource keyed by (proposal, voter).
///
/// Only nonzero allocations are stored. Records of passed proposals stay as
/// history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteLedger {
    votes: BTreeMap<(ProposalId, AccountId), Vote>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, proposal: ProposalId, voter: &AccountId) -> Option<&Vote> {
        self.votes.get(&(proposal, voter.clone()))
    }

    /// Store `vote`, or drop the record when its percentage is zero.
    pub fn set(&mut self, proposal: ProposalId, voter: &AccountId, vote: Vote) {
        let key = (proposal, voter.clone());
        if vote.percentage.is_zero() {
            self.votes.remove(&key);
        } else {
            self.votes.insert(key, vote);
        }
    }

    /// Voters holding a record on `proposal`.
    pub fn voters_of(&self, proposal: ProposalId) -> Vec<AccountId> {
        self.votes
            .range((proposal, AccountId::new(""))..)
            .take_while(|((id, _), _)| *id == proposal)
            .map(|((_, voter), _)| voter.clone())
            .collect()
    }

    /// Sum of every recorded contribution to `proposal` at `step`.
    pub fn totals_at(
        &self,
        proposal: ProposalId,
        step: u64,
    ) -> Result<(SignedFixed, SignedFixed), GovernanceError> {
        let overflow = || GovernanceError::Math(MathError::Overflow);
        let mut weight = SignedFixed::ZERO;
        let mut flow = SignedFixed::ZERO;
        for ((_, _), vote) in self
            .votes
            .range((proposal, AccountId::new(""))..)
            .take_while(|((id, _), _)| *id == proposal)
        {
            let (w, f) = vote.contribution_at(step)?;
            weight = weight.checked_add(w).ok_or_else(overflow)?;
            flow = flow.checked_add(f).ok_or_else(overflow)?;
        }
        Ok((weight, flow))
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
