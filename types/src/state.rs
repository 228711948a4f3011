//! Account state as reported by the external balance/streaming ledger.

use crate::account::{AccountId, ResourceId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Snapshot of one account's holdings of one resource.
///
/// `balance` is exact as of `updated_at`; from then on it drifts by
/// `flow_rate` raw units per second (negative for a net outgoing stream).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Raw token units held at `updated_at`.
    pub balance: u128,
    /// Net raw units per second, signed.
    pub flow_rate: i128,
    /// When `balance` was last settled.
    pub updated_at: Timestamp,
}

impl AccountState {
    /// An account that holds nothing and streams nothing.
    pub const EMPTY: Self = Self {
        balance: 0,
        flow_rate: 0,
        updated_at: Timestamp::EPOCH,
    };

    pub fn new(balance: u128, flow_rate: i128, updated_at: Timestamp) -> Self {
        Self {
            balance,
            flow_rate,
            updated_at,
        }
    }

    /// `balance + flow_rate * (now - updated_at)`, floored at zero.
    pub fn effective_balance(&self, now: Timestamp) -> u128 {
        let elapsed = i128::from(self.updated_at.elapsed_since(now));
        let drift = self.flow_rate.saturating_mul(elapsed);
        if drift >= 0 {
            self.balance.saturating_add(drift.unsigned_abs())
        } else {
            self.balance.saturating_sub(drift.unsigned_abs())
        }
    }

    /// `balance + flow_rate * (at - updated_at)` for `at` on either side of
    /// `updated_at`. Not floored, so an outflow that ran dry reads negative
    /// and an inflow is traced back past zero. Saturates at the i128 range.
    pub fn projected_balance(&self, at: Timestamp) -> i128 {
        let balance = i128::try_from(self.balance).unwrap_or(i128::MAX);
        let drift = if at >= self.updated_at {
            self.flow_rate
                .saturating_mul(i128::from(self.updated_at.elapsed_since(at)))
        } else {
            self.flow_rate
                .saturating_mul(i128::from(at.elapsed_since(self.updated_at)))
                .saturating_neg()
        };
        balance.saturating_add(drift)
    }

    /// Whether the account's holdings are exhausted at `now`.
    pub fn is_depleted(&self, now: Timestamp) -> bool {
        self.effective_balance(now) == 0
    }
}

/// Read-only view of the external account ledger.
///
/// The core queries it whenever it needs a voter's current holdings; it never
/// writes through it.
pub trait AccountStateSource {
    /// Current state of `account`'s holdings of `resource`. Unknown accounts
    /// report [`AccountState::EMPTY`].
    fn account_state(&self, resource: &ResourceId, account: &AccountId) -> AccountState;
}

impl<T: AccountStateSource + ?Sized> AccountStateSource for &T {
    fn account_state(&self, resource: &ResourceId, account: &AccountId) -> AccountState {
        (**self).account_state(resource, account)
    }
}

impl<T: AccountStateSource + ?Sized> AccountStateSource for std::sync::Arc<T> {
    fn account_state(&self, resource: &ResourceId, account: &AccountId) -> AccountState {
        (**self).account_state(resource, account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_balance_adds_inflow() {
        let state = AccountState::new(1_000, 10, Timestamp::new(100));
        assert_eq!(state.effective_balance(Timestamp::new(160)), 1_600);
    }

    #[test]
    fn effective_balance_floors_outflow_at_zero() {
        let state = AccountState::new(1_000, -10, Timestamp::new(100));
        assert_eq!(state.effective_balance(Timestamp::new(150)), 500);
        assert_eq!(state.effective_balance(Timestamp::new(1_000)), 0);
        assert!(state.is_depleted(Timestamp::new(200)));
    }

    #[test]
    fn default_state_is_empty() {
        assert_eq!(AccountState::default(), AccountState::EMPTY);
        assert_eq!(Timestamp::default(), Timestamp::EPOCH);
    }

    #[test]
    fn projected_balance_runs_both_ways() {
        let state = AccountState::new(1_000, -10, Timestamp::new(100));
        assert_eq!(state.projected_balance(Timestamp::new(40)), 1_600);
        assert_eq!(state.projected_balance(Timestamp::new(100)), 1_000);
        assert_eq!(state.projected_balance(Timestamp::new(250)), -500);

        let inflow = AccountState::new(30, 1, Timestamp::new(90));
        assert_eq!(inflow.projected_balance(Timestamp::new(60)), 0);
        assert_eq!(inflow.projected_balance(Timestamp::new(50)), -10);
    }

    #[test]
    fn effective_balance_ignores_time_before_update() {
        let state = AccountState::new(1_000, -10, Timestamp::new(100));
        assert_eq!(state.effective_balance(Timestamp::new(50)), 1_000);
    }
}
