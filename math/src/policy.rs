//! How a drifting aggregate weight is treated once it would cross zero.

use serde::{Deserialize, Serialize};

/// Treatment of the per-step input `x_i = x0 + i * r` when it goes negative.
///
/// A negative aggregate weight has no physical meaning (no voter can hold
/// less than nothing), but it does arise when a depleting stream has not yet
/// been reported by the account ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RampPolicy {
    /// Evaluate the raw recurrence; `x_i` may go negative. Only the final
    /// conviction is floored at zero.
    #[default]
    Unbounded,
    /// Clamp every `x_i` at zero. The window is split at the ramp/plateau
    /// boundary and the zero-weight phase contributes pure decay.
    FloorAtZero,
}
