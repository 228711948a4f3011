//! Inbound notifications from the account ledger.
//!
//! Whenever a voter's balance or stream changes, the ledger calls
//! [`ConvictionEngine::on_account_state_changed`]. Every proposal the voter
//! backs is synced with its old aggregates up to the change, then the
//! voter's contribution is recomputed from the new holdings. Status is never
//! evaluated here.

use conviction_types::{AccountId, AccountStateSource, Fixed, ResourceId, Timestamp};

use crate::engine::ConvictionEngine;
use crate::error::GovernanceError;
use crate::event::ConvictionEvent;
use crate::vote::{voter_contribution, Vote};

impl<L: AccountStateSource> ConvictionEngine<L> {
    /// Resync `account`'s votes in `resource` after its holdings changed.
    ///
    /// Only the configured trusted ledger may call this. Unknown resources
    /// and accounts without live allocations are no-ops. Index entries of
    /// proposals that are no longer Active are pruned.
    pub fn on_account_state_changed(
        &mut self,
        sender: &AccountId,
        resource: &ResourceId,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        if *sender != self.config.trusted_ledger {
            tracing::warn!(%sender, %resource, %account, "untrusted account-state notification");
            return Err(GovernanceError::Unauthorized {
                caller: sender.to_string(),
                action: "report account state changes",
            });
        }
        let policy = self.config.ramp_policy;
        let Some(ledger) = self.resources.get_mut(resource) else {
            tracing::debug!(%resource, %account, "notification for unknown resource ignored");
            return Ok(());
        };
        let indexed = ledger.index.proposals_of(account);
        if indexed.is_empty() {
            return Ok(());
        }

        let state = self.accounts.account_state(resource, account);
        let mut updates = Vec::with_capacity(indexed.len());
        let mut stale = Vec::new();
        for id in indexed {
            let proposal = match ledger.proposals.get(id) {
                Ok(proposal) if proposal.is_active() => proposal,
                _ => {
                    stale.push(id);
                    continue;
                }
            };
            let Some(vote) = ledger.votes.get(id, account).copied() else {
                stale.push(id);
                continue;
            };

            let mut updated = proposal.clone();
            updated.sync_to(now, policy)?;
            let step = updated.last_synced_step;
            let old = vote.contribution_at(step)?;
            let new = voter_contribution(
                &state,
                updated.step_start(step),
                vote.percentage,
                &updated.params,
            )?;
            updated.replace_contribution(old, new)?;
            updates.push((
                updated,
                Vote {
                    weight: new.0,
                    flow: new.1,
                    synced_step: step,
                    ..vote
                },
            ));
        }

        for id in &stale {
            ledger.index.set_allocation(account, *id, Fixed::ZERO)?;
        }
        let resynced = updates.len();
        for (proposal, vote) in updates {
            ledger.votes.set(proposal.id, account, vote);
            ledger.proposals.put(proposal);
        }

        tracing::debug!(
            %resource,
            %account,
            resynced,
            pruned = stale.len(),
            "account votes resynced"
        );
        self.events.emit(&ConvictionEvent::AccountResynced {
            resource: resource.clone(),
            account: account.clone(),
            proposals: resynced,
        });
        Ok(())
    }
}
