//! Binary snapshots of a single resource's ledger.

use crate::error::GovernanceError;
use crate::ledger::ResourceLedger;
use serde::{Deserialize, Serialize};

/// Bumped whenever the encoded layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct ResourceSnapshot {
    version: u32,
    ledger: ResourceLedger,
}

pub fn encode(ledger: &ResourceLedger) -> Result<Vec<u8>, GovernanceError> {
    let snapshot = ResourceSnapshot {
        version: SNAPSHOT_VERSION,
        ledger: ledger.clone(),
    };
    bincode::serialize(&snapshot).map_err(|e| GovernanceError::Serialization(e.to_string()))
}

/// Decode and verify a snapshot. Rejects unknown versions and ledgers whose
/// index or aggregates are inconsistent.
pub fn decode(bytes: &[u8]) -> Result<ResourceLedger, GovernanceError> {
    let snapshot: ResourceSnapshot =
        bincode::deserialize(bytes).map_err(|e| GovernanceError::Serialization(e.to_string()))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(GovernanceError::Serialization(format!(
            "unsupported snapshot version {}, expected {}",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }
    snapshot.ledger.verify()?;
    Ok(snapshot.ledger)
}
