//! Conviction engine: proposals, votes and evaluation across resources.

use std::collections::BTreeMap;

use conviction_types::{AccountId, AccountStateSource, Fixed, ResourceId, SignedFixed, Timestamp};

use crate::config::ConvictionConfig;
use crate::error::GovernanceError;
use crate::event::{ConvictionEvent, EventBus, Listener};
use crate::ledger::ResourceLedger;
use crate::params::ProposalParams;
use crate::proposal::{Proposal, ProposalId, ProposalStatus};
use crate::snapshot;
use crate::vote::{voter_contribution, Vote};

/// Entry point for every operation on the conviction ledger.
///
/// Holds one [`ResourceLedger`] per governed resource and reads voters'
/// holdings from `accounts`. Every operation either completes or fails
/// without writing anything.
pub struct ConvictionEngine<L> {
    pub(crate) accounts: L,
    pub(crate) config: ConvictionConfig,
    pub(crate) resources: BTreeMap<ResourceId, ResourceLedger>,
    pub(crate) events: EventBus,
}

impl<L: AccountStateSource> ConvictionEngine<L> {
    pub fn new(accounts: L, config: ConvictionConfig) -> Self {
        Self {
            accounts,
            config,
            resources: BTreeMap::new(),
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &ConvictionConfig {
        &self.config
    }

    pub fn accounts(&self) -> &L {
        &self.accounts
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.events.subscribe(listener);
    }

    /// Make `owner` the only account allowed to create proposals in
    /// `resource`, opening the namespace if it does not exist yet.
    pub fn designate_owner(&mut self, resource: &ResourceId, owner: &AccountId) {
        match self.resources.get_mut(resource) {
            Some(ledger) => ledger.owner = owner.clone(),
            None => {
                self.resources.insert(
                    resource.clone(),
                    ResourceLedger::new(resource.clone(), owner.clone()),
                );
            }
        }
        tracing::info!(%resource, %owner, "resource owner designated");
    }

    /// Create an Active proposal in `resource`. Only its designated owner
    /// may do so.
    pub fn create_proposal(
        &mut self,
        resource: &ResourceId,
        owner: &AccountId,
        params: ProposalParams,
        payload: Vec<u8>,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let ledger = match self.resources.get_mut(resource) {
            Some(ledger) if ledger.owner == *owner => ledger,
            _ => {
                tracing::warn!(%resource, caller = %owner, "proposal creation rejected");
                return Err(GovernanceError::Unauthorized {
                    caller: owner.to_string(),
                    action: "create proposals",
                });
            }
        };
        let id = ledger
            .proposals
            .create(owner.clone(), params, payload, now)?;

        tracing::info!(%resource, proposal = %id, %owner, "proposal created");
        self.events.emit(&ConvictionEvent::ProposalCreated {
            resource: resource.clone(),
            proposal: id,
            owner: owner.clone(),
        });
        Ok(id)
    }

    /// Create a proposal with the configured default parameters.
    pub fn create_default_proposal(
        &mut self,
        resource: &ResourceId,
        owner: &AccountId,
        payload: Vec<u8>,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let params = self.config.default_params.clone();
        self.create_proposal(resource, owner, params, payload, now)
    }

    /// Set `voter`'s share of their holdings committed to `proposal`.
    ///
    /// The proposal is synced to `now` with its previous aggregates before
    /// the voter's old contribution is swapped for the new one, so
    /// conviction accrued so far is kept. Zero withdraws the vote.
    ///
    /// A percentage above 1 is malformed input and fails with
    /// `InvalidParameter` whatever the voter already holds elsewhere;
    /// `AllocationExceeded` is reserved for valid shares that do not fit
    /// next to the voter's other allocations.
    pub fn vote(
        &mut self,
        resource: &ResourceId,
        proposal: ProposalId,
        voter: &AccountId,
        percentage: Fixed,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        if percentage > Fixed::ONE {
            return Err(GovernanceError::InvalidParameter(format!(
                "percentage {percentage} exceeds 1"
            )));
        }
        let policy = self.config.ramp_policy;
        let ledger = self
            .resources
            .get_mut(resource)
            .ok_or_else(|| GovernanceError::ResourceNotFound(resource.to_string()))?;

        let mut updated = ledger.proposals.get(proposal)?.clone();
        if !updated.is_active() {
            tracing::warn!(%resource, %proposal, %voter, "vote on a closed proposal rejected");
            return Err(GovernanceError::ProposalNotActive(proposal.to_string()));
        }
        if let Err(err) = ledger.index.projected_total(voter, proposal, percentage) {
            tracing::warn!(%resource, %proposal, %voter, %percentage, "allocation rejected");
            return Err(err);
        }

        updated.sync_to(now, policy)?;
        let step = updated.last_synced_step;
        let old = match ledger.votes.get(proposal, voter) {
            Some(vote) => vote.contribution_at(step)?,
            None => (SignedFixed::ZERO, SignedFixed::ZERO),
        };
        let state = self.accounts.account_state(resource, voter);
        let new = voter_contribution(
            &state,
            updated.step_start(step),
            percentage,
            &updated.params,
        )?;
        updated.replace_contribution(old, new)?;

        ledger.index.set_allocation(voter, proposal, percentage)?;
        ledger.votes.set(
            proposal,
            voter,
            Vote {
                percentage,
                weight: new.0,
                flow: new.1,
                synced_step: step,
            },
        );
        let conviction = updated.last_conviction;
        ledger.proposals.put(updated);

        tracing::debug!(
            %resource,
            %proposal,
            %voter,
            %percentage,
            weight = %new.0,
            flow = %new.1,
            %conviction,
            "vote recorded"
        );
        self.events.emit(&ConvictionEvent::UserVoted {
            resource: resource.clone(),
            proposal,
            voter: voter.clone(),
            percentage,
            conviction,
        });
        Ok(())
    }

    /// Bring `proposal` up to `now` and pass it if its conviction reached
    /// the requirement.
    ///
    /// With `evaluate_window_peak` set, the highest conviction anywhere
    /// since the previous sync counts, so a proposal whose support peaked
    /// and then drained between two evaluations still passes. The only
    /// operation that changes a proposal's status.
    pub fn sync_and_evaluate(
        &mut self,
        resource: &ResourceId,
        proposal: ProposalId,
        now: Timestamp,
    ) -> Result<(Fixed, ProposalStatus), GovernanceError> {
        let policy = self.config.ramp_policy;
        let window_peak = self.config.evaluate_window_peak;
        let ledger = self
            .resources
            .get_mut(resource)
            .ok_or_else(|| GovernanceError::ResourceNotFound(resource.to_string()))?;

        let mut updated = ledger.proposals.get(proposal)?.clone();
        let window = updated.sync_to(now, policy)?;

        let mut reached = None;
        if updated.is_active() {
            let best = if window_peak {
                window.peak(updated.params.alpha, policy)?
            } else {
                updated.last_conviction
            };
            if best >= updated.params.required_conviction {
                updated.status = ProposalStatus::Passed;
                updated.passed_at = Some(now);
                reached = Some(best);
            }
        }

        let conviction = updated.last_conviction;
        let status = updated.status;
        tracing::debug!(
            %resource,
            %proposal,
            steps = window.steps,
            %conviction,
            "proposal synced"
        );
        ledger.proposals.put(updated);

        if let Some(best) = reached {
            let released = ledger.release_allocations(proposal)?;
            tracing::info!(
                %resource,
                %proposal,
                conviction = %best,
                released,
                "proposal passed"
            );
            self.events.emit(&ConvictionEvent::ProposalPassed {
                resource: resource.clone(),
                proposal,
                conviction: best,
                at: now,
            });
        }
        Ok((conviction, status))
    }

    /// Conviction `proposal` would have at `now`, without syncing it.
    pub fn conviction_at(
        &self,
        resource: &ResourceId,
        proposal: ProposalId,
        now: Timestamp,
    ) -> Result<Fixed, GovernanceError> {
        let mut projected = self.proposal(resource, proposal)?.clone();
        projected.sync_to(now, self.config.ramp_policy)?;
        Ok(projected.last_conviction)
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn ledger(&self, resource: &ResourceId) -> Result<&ResourceLedger, GovernanceError> {
        self.resources
            .get(resource)
            .ok_or_else(|| GovernanceError::ResourceNotFound(resource.to_string()))
    }

    pub fn owner(&self, resource: &ResourceId) -> Option<&AccountId> {
        self.resources.get(resource).map(|ledger| &ledger.owner)
    }

    pub fn proposal(
        &self,
        resource: &ResourceId,
        proposal: ProposalId,
    ) -> Result<&Proposal, GovernanceError> {
        self.ledger(resource)?.proposals.get(proposal)
    }

    /// Every proposal id of `resource`, in creation order.
    pub fn proposals(&self, resource: &ResourceId) -> Vec<ProposalId> {
        self.resources
            .get(resource)
            .map(|ledger| ledger.proposals.ids())
            .unwrap_or_default()
    }

    pub fn last_conviction(
        &self,
        resource: &ResourceId,
        proposal: ProposalId,
    ) -> Result<Fixed, GovernanceError> {
        Ok(self.proposal(resource, proposal)?.last_conviction)
    }

    fn vote_record(
        &self,
        resource: &ResourceId,
        proposal: ProposalId,
        voter: &AccountId,
    ) -> Result<Option<Vote>, GovernanceError> {
        let ledger = self.ledger(resource)?;
        ledger.proposals.get(proposal)?;
        Ok(ledger.votes.get(proposal, voter).copied())
    }

    /// Share of `voter`'s holdings committed to `proposal`; zero if none.
    pub fn vote_percentage(
        &self,
        resource: &ResourceId,
        proposal: ProposalId,
        voter: &AccountId,
    ) -> Result<Fixed, GovernanceError> {
        Ok(self
            .vote_record(resource, proposal, voter)?
            .map_or(Fixed::ZERO, |vote| vote.percentage))
    }

    /// Weight `voter` contributed when their vote was last recorded.
    pub fn vote_amount(
        &self,
        resource: &ResourceId,
        proposal: ProposalId,
        voter: &AccountId,
    ) -> Result<SignedFixed, GovernanceError> {
        Ok(self
            .vote_record(resource, proposal, voter)?
            .map_or(SignedFixed::ZERO, |vote| vote.weight))
    }

    /// Per-step weight change of `voter`'s vote.
    pub fn vote_flow(
        &self,
        resource: &ResourceId,
        proposal: ProposalId,
        voter: &AccountId,
    ) -> Result<SignedFixed, GovernanceError> {
        Ok(self
            .vote_record(resource, proposal, voter)?
            .map_or(SignedFixed::ZERO, |vote| vote.flow))
    }

    /// Active proposals `voter` currently allocates to.
    pub fn voting_proposals_for_voter(
        &self,
        resource: &ResourceId,
        voter: &AccountId,
    ) -> Vec<ProposalId> {
        self.resources
            .get(resource)
            .map(|ledger| ledger.index.proposals_of(voter))
            .unwrap_or_default()
    }

    /// Total share of `voter`'s holdings committed across `resource`.
    pub fn total_allocation(&self, resource: &ResourceId, voter: &AccountId) -> Fixed {
        self.resources
            .get(resource)
            .map_or(Fixed::ZERO, |ledger| ledger.index.total(voter))
    }

    // ── Persistence ────────────────────────────────────────────────────

    pub fn save_resource(&self, resource: &ResourceId) -> Result<Vec<u8>, GovernanceError> {
        let bytes = snapshot::encode(self.ledger(resource)?)?;
        tracing::debug!(%resource, bytes = bytes.len(), "resource saved");
        Ok(bytes)
    }

    /// Restore a resource from [`save_resource`](Self::save_resource)
    /// output, replacing any in-memory state of the same resource.
    pub fn load_resource(&mut self, bytes: &[u8]) -> Result<ResourceId, GovernanceError> {
        let ledger = snapshot::decode(bytes)?;
        let resource = ledger.resource.clone();
        tracing::info!(
            %resource,
            proposals = ledger.proposals.len(),
            votes = ledger.votes.len(),
            "resource loaded"
        );
        self.resources.insert(resource.clone(), ledger);
        Ok(resource)
    }
}
