//! Events emitted as proposals are created, voted on, and pass.

use crate::proposal::ProposalId;
use conviction_types::{AccountId, Fixed, ResourceId, Timestamp};

/// Ledger-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConvictionEvent {
    ProposalCreated {
        resource: ResourceId,
        proposal: ProposalId,
        owner: AccountId,
    },
    /// A voter changed their allocation to a proposal.
    UserVoted {
        resource: ResourceId,
        proposal: ProposalId,
        voter: AccountId,
        percentage: Fixed,
        conviction: Fixed,
    },
    /// A proposal crossed its required conviction.
    ProposalPassed {
        resource: ResourceId,
        proposal: ProposalId,
        conviction: Fixed,
        at: Timestamp,
    },
    /// The account ledger reported a change and the account's votes were
    /// recomputed.
    AccountResynced {
        resource: ResourceId,
        account: AccountId,
        proposals: usize,
    },
}

pub type Listener = Box<dyn Fn(&ConvictionEvent) + Send + Sync>;

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline after the emitting operation has committed;
/// keep handlers fast.
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &ConvictionEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    fn passed() -> ConvictionEvent {
        ConvictionEvent::ProposalPassed {
            resource: ResourceId::new("token"),
            proposal: ProposalId::new(0),
            conviction: Fixed::from_int(1_000),
            at: Timestamp::new(60),
        }
    }

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));

        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&passed());
        assert_eq!(counter.load(Ordering::SeqCst), 11);
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::new();
        bus.emit(&passed());
    }

    #[test]
    fn listener_receives_the_emitted_event() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Arc::clone(&seen);
        bus.subscribe(Box::new(move |event| {
            sink.lock().unwrap().push(event.clone());
        }));

        bus.emit(&passed());
        assert_eq!(seen.lock().unwrap().as_slice(), &[passed()]);
    }
}
