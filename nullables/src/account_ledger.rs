//! Nullable account ledger: in-memory balances and streams.

use conviction_types::{AccountId, AccountState, AccountStateSource, ResourceId, Timestamp};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// An in-memory stand-in for the external balance/streaming ledger.
///
/// Balances are settled at every mutation, so `updated_at` always records
/// the last change. Thread-safe; share it with the engine through an `Arc`
/// or a reference.
#[derive(Debug, Default)]
pub struct NullAccountLedger {
    accounts: Mutex<HashMap<(ResourceId, AccountId), AccountState>>,
}

impl NullAccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn accounts(&self) -> MutexGuard<'_, HashMap<(ResourceId, AccountId), AccountState>> {
        self.accounts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn settle<'a>(
        accounts: &'a mut HashMap<(ResourceId, AccountId), AccountState>,
        resource: &ResourceId,
        account: &AccountId,
        now: Timestamp,
    ) -> &'a mut AccountState {
        let state = accounts
            .entry((resource.clone(), account.clone()))
            .or_insert(AccountState::new(0, 0, now));
        state.balance = state.effective_balance(now);
        state.updated_at = now;
        state
    }

    /// Overwrite the settled balance, keeping any running stream.
    pub fn set_balance(&self, resource: &ResourceId, account: &AccountId, balance: u128, now: Timestamp) {
        let mut accounts = self.accounts();
        Self::settle(&mut accounts, resource, account, now).balance = balance;
    }

    /// Replace the account's net stream, settling what accrued so far.
    pub fn set_flow(&self, resource: &ResourceId, account: &AccountId, flow_rate: i128, now: Timestamp) {
        let mut accounts = self.accounts();
        Self::settle(&mut accounts, resource, account, now).flow_rate = flow_rate;
    }

    /// Move `amount` from one account to another. Returns `false`, leaving
    /// holdings unchanged, when `from` holds less.
    pub fn transfer(
        &self,
        resource: &ResourceId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
        now: Timestamp,
    ) -> bool {
        let mut accounts = self.accounts();
        let source = Self::settle(&mut accounts, resource, from, now);
        if source.balance < amount {
            return false;
        }
        source.balance -= amount;
        let target = Self::settle(&mut accounts, resource, to, now);
        target.balance = target.balance.saturating_add(amount);
        true
    }

    /// Open a stream of `rate` units per second from `from` to `to`, on top
    /// of whatever both already stream.
    pub fn open_stream(
        &self,
        resource: &ResourceId,
        from: &AccountId,
        to: &AccountId,
        rate: i128,
        now: Timestamp,
    ) {
        let mut accounts = self.accounts();
        let source = Self::settle(&mut accounts, resource, from, now);
        source.flow_rate = source.flow_rate.saturating_sub(rate);
        let target = Self::settle(&mut accounts, resource, to, now);
        target.flow_rate = target.flow_rate.saturating_add(rate);
    }

    pub fn state(&self, resource: &ResourceId, account: &AccountId) -> AccountState {
        self.accounts()
            .get(&(resource.clone(), account.clone()))
            .copied()
            .unwrap_or(AccountState::EMPTY)
    }
}

impl AccountStateSource for NullAccountLedger {
    fn account_state(&self, resource: &ResourceId, account: &AccountId) -> AccountState {
        self.state(resource, account)
    }
}
