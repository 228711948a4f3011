//! Per-voter index of live allocations.
//!
//! For every voter of a resource: which proposals hold a nonzero share of
//! their holdings, and the running total. The total never exceeds 100%.

use crate::error::GovernanceError;
use crate::proposal::ProposalId;
use conviction_types::{AccountId, Fixed};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterAllocations {
    proposals: BTreeMap<ProposalId, Fixed>,
    total: Fixed,
}

impl VoterAllocations {
    pub fn total(&self) -> Fixed {
        self.total
    }

    pub fn percentage(&self, proposal: ProposalId) -> Fixed {
        self.proposals.get(&proposal).copied().unwrap_or(Fixed::ZERO)
    }

    pub fn proposals(&self) -> impl Iterator<Item = ProposalId> + '_ {
        self.proposals.keys().copied()
    }

    fn sum(&self) -> Option<Fixed> {
        self.proposals
            .values()
            .try_fold(Fixed::ZERO, |acc, pct| acc.checked_add(*pct))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVotingIndex {
    voters: BTreeMap<AccountId, VoterAllocations>,
}

impl UserVotingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, voter: &AccountId) -> Option<&VoterAllocations> {
        self.voters.get(voter)
    }

    pub fn total(&self, voter: &AccountId) -> Fixed {
        self.voters
            .get(voter)
            .map(VoterAllocations::total)
            .unwrap_or(Fixed::ZERO)
    }

    pub fn proposals_of(&self, voter: &AccountId) -> Vec<ProposalId> {
        self.voters
            .get(voter)
            .map(|entry| entry.proposals().collect())
            .unwrap_or_default()
    }

    /// Total `voter` would hold after moving `proposal` to `percentage`.
    pub fn projected_total(
        &self,
        voter: &AccountId,
        proposal: ProposalId,
        percentage: Fixed,
    ) -> Result<Fixed, GovernanceError> {
        let exceeded = || GovernanceError::AllocationExceeded {
            voter: voter.to_string(),
            requested: format!("more than {}", Fixed::ONE),
        };
        let (total, current) = self
            .voters
            .get(voter)
            .map(|entry| (entry.total(), entry.percentage(proposal)))
            .unwrap_or((Fixed::ZERO, Fixed::ZERO));
        let projected = total
            .saturating_sub(current)
            .checked_add(percentage)
            .ok_or_else(exceeded)?;
        if projected > Fixed::ONE {
            return Err(GovernanceError::AllocationExceeded {
                voter: voter.to_string(),
                requested: projected.to_string(),
            });
        }
        Ok(projected)
    }

    /// The single write path: set `voter`'s share of `proposal` and recompute
    /// the running total. Zero removes the entry. Fails without writing when
    /// the total would exceed 100%.
    pub fn set_allocation(
        &mut self,
        voter: &AccountId,
        proposal: ProposalId,
        percentage: Fixed,
    ) -> Result<Fixed, GovernanceError> {
        self.projected_total(voter, proposal, percentage)?;

        let entry = self.voters.entry(voter.clone()).or_default();
        if percentage.is_zero() {
            entry.proposals.remove(&proposal);
        } else {
            entry.proposals.insert(proposal, percentage);
        }
        entry.total = entry.sum().ok_or_else(|| GovernanceError::AllocationExceeded {
            voter: voter.to_string(),
            requested: "an unrepresentable total".into(),
        })?;

        let total = entry.total;
        if entry.proposals.is_empty() {
            self.voters.remove(voter);
        }
        Ok(total)
    }

    /// Whether every voter's total matches its entries and stays within 100%.
    pub fn is_consistent(&self) -> bool {
        self.voters.values().all(|entry| {
            !entry.proposals.is_empty()
                && entry.sum() == Some(entry.total)
                && entry.total <= Fixed::ONE
        })
    }

    pub fn voter_count(&self) -> usize {
        self.voters.len()
    }
}
