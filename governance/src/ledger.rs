//! Everything one governed resource owns.

use crate::error::GovernanceError;
use crate::index::UserVotingIndex;
use crate::proposal::{ProposalId, ProposalStore};
use crate::vote::VoteLedger;
use conviction_types::{AccountId, Fixed, ResourceId};
use serde::{Deserialize, Serialize};

/// Proposals, votes and the voter index of one resource.
///
/// Namespaces never share state, so a host may lock each one separately.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    pub resource: ResourceId,
    /// Sole account allowed to create proposals here.
    pub owner: AccountId,
    pub proposals: ProposalStore,
    pub votes: VoteLedger,
    pub index: UserVotingIndex,
}

impl ResourceLedger {
    pub fn new(resource: ResourceId, owner: AccountId) -> Self {
        Self {
            resource,
            owner,
            proposals: ProposalStore::new(),
            votes: VoteLedger::new(),
            index: UserVotingIndex::new(),
        }
    }

    /// Drop every voter's index entry for `proposal`. Vote records remain.
    pub fn release_allocations(&mut self, proposal: ProposalId) -> Result<usize, GovernanceError> {
        let voters = self.votes.voters_of(proposal);
        let mut released = 0;
        for voter in &voters {
            let held = self
                .index
                .get(voter)
                .map_or(Fixed::ZERO, |entry| entry.percentage(proposal));
            if held.is_zero() {
                continue;
            }
            self.index.set_allocation(voter, proposal, Fixed::ZERO)?;
            released += 1;
        }
        Ok(released)
    }

    /// Structural checks run on every loaded snapshot.
    pub fn verify(&self) -> Result<(), GovernanceError> {
        if !self.index.is_consistent() {
            return Err(GovernanceError::Serialization(format!(
                "voter index of {} exceeds full allocation or disagrees with its totals",
                self.resource
            )));
        }
        for id in self.proposals.ids() {
            let proposal = self.proposals.get(id)?;
            let (weight, flow) = self.votes.totals_at(id, proposal.last_synced_step)?;
            if weight != proposal.aggregate_weight || flow != proposal.aggregate_flow {
                return Err(GovernanceError::Serialization(format!(
                    "aggregates of proposal {id} disagree with its votes"
                )));
            }
        }
        Ok(())
    }
}
