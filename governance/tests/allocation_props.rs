use std::sync::Arc;

use proptest::prelude::*;

use conviction_governance::{ConvictionConfig, ConvictionEngine, GovernanceError, ProposalParams, ProposalStatus};
use conviction_nullables::NullAccountLedger;
use conviction_types::{AccountId, Fixed, ResourceId, Timestamp};

const ETHER: u128 = 1_000_000_000_000_000_000;
const VOTERS: [&str; 3] = ["alice", "bob", "carol"];
const PROPOSALS: u64 = 4;

#[derive(Clone, Debug)]
enum Action {
    Vote { voter: usize, proposal: u64, percent: u128 },
    Rebalance { voter: usize, balance: u128 },
    Evaluate { proposal: u64 },
    Wait { secs: u64 },
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (0..VOTERS.len(), 0..PROPOSALS, 0u128..=100)
            .prop_map(|(voter, proposal, percent)| Action::Vote { voter, proposal, percent }),
        1 => (0..VOTERS.len(), 0u128..10).prop_map(|(voter, ether)| Action::Rebalance {
            voter,
            balance: ether * ETHER,
        }),
        1 => (0..PROPOSALS).prop_map(|proposal| Action::Evaluate { proposal }),
        2 => (0u64..600).prop_map(|secs| Action::Wait { secs }),
    ]
}

proptest! {
    /// Whatever sequence of votes, balance changes and evaluations arrives,
    /// no voter ever commits more than 100%, the index agrees with itself,
    /// and every aggregate equals the sum of its votes.
    #[test]
    fn allocation_invariant_holds(actions in proptest::collection::vec(action(), 1..60)) {
        let accounts = Arc::new(NullAccountLedger::new());
        let config = ConvictionConfig::default();
        let ledger_id = config.trusted_ledger.clone();
        let mut engine = ConvictionEngine::new(Arc::clone(&accounts), config);
        let token = ResourceId::new("token");
        let owner = AccountId::new("dao");
        engine.designate_owner(&token, &owner);

        let params = ProposalParams {
            required_conviction: Fixed::from_int(20),
            ..ProposalParams::default()
        };
        let ids: Vec<_> = (0..PROPOSALS)
            .map(|_| engine.create_proposal(&token, &owner, params.clone(), Vec::new(), Timestamp::new(0)).unwrap())
            .collect();
        let voters: Vec<_> = VOTERS.iter().map(|name| AccountId::new(*name)).collect();
        for voter in &voters {
            accounts.set_balance(&token, voter, ETHER, Timestamp::new(0));
        }

        let mut now = 0u64;
        for action in actions {
            let at = Timestamp::new(now);
            match action {
                Action::Vote { voter, proposal, percent } => {
                    let id = ids[proposal as usize];
                    let voter = &voters[voter];
                    let before = engine.ledger(&token).unwrap().clone();
                    let percentage = Fixed::from_ratio(percent, 100).unwrap();
                    match engine.vote(&token, id, voter, percentage, at) {
                        Ok(()) => {
                            prop_assert_eq!(engine.vote_percentage(&token, id, voter).unwrap(), percentage);
                        }
                        Err(GovernanceError::AllocationExceeded { .. }) => {
                            prop_assert_eq!(engine.ledger(&token).unwrap(), &before);
                        }
                        Err(GovernanceError::ProposalNotActive(_)) => {
                            prop_assert_eq!(
                                engine.proposal(&token, id).unwrap().status,
                                ProposalStatus::Passed
                            );
                            prop_assert_eq!(engine.ledger(&token).unwrap(), &before);
                        }
                        Err(other) => prop_assert!(false, "unexpected error: {other}"),
                    }
                }
                Action::Rebalance { voter, balance } => {
                    accounts.set_balance(&token, &voters[voter], balance, at);
                    engine.on_account_state_changed(&ledger_id, &token, &voters[voter], at).unwrap();
                }
                Action::Evaluate { proposal } => {
                    let id = ids[proposal as usize];
                    let was = engine.proposal(&token, id).unwrap().status;
                    let (_, status) = engine.sync_and_evaluate(&token, id, at).unwrap();
                    if was == ProposalStatus::Passed {
                        prop_assert_eq!(status, ProposalStatus::Passed);
                    }
                }
                Action::Wait { secs } => now += secs,
            }

            let ledger = engine.ledger(&token).unwrap();
            prop_assert!(ledger.index.is_consistent());
            prop_assert!(ledger.verify().is_ok());
            for voter in &voters {
                prop_assert!(engine.total_allocation(&token, voter) <= Fixed::ONE);
                for id in engine.voting_proposals_for_voter(&token, voter) {
                    prop_assert_eq!(engine.proposal(&token, id).unwrap().status, ProposalStatus::Active);
                }
            }
        }
    }
}
