//! Per-proposal conviction parameters.

use crate::error::GovernanceError;
use conviction_types::Fixed;
use serde::{Deserialize, Serialize};

/// How a proposal accumulates conviction and when it passes.
///
/// Fixed at creation; a proposal never changes its parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalParams {
    /// Fraction of conviction retained per step, strictly between 0 and 1.
    #[serde(default = "default_alpha")]
    pub alpha: Fixed,

    /// Conviction at which the proposal passes.
    #[serde(default = "default_required_conviction")]
    pub required_conviction: Fixed,

    /// Wall-clock length of one step.
    #[serde(default = "default_step_duration_secs")]
    pub step_duration_secs: u32,

    /// Raw token units that make up one unit of voting weight.
    #[serde(default = "default_weight_scaling_factor")]
    pub weight_scaling_factor: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_alpha() -> Fixed {
    Fixed::from_raw(9_000_000)
}

fn default_required_conviction() -> Fixed {
    Fixed::from_int(1_000)
}

fn default_step_duration_secs() -> u32 {
    60
}

fn default_weight_scaling_factor() -> u64 {
    1_000_000_000_000_000_000
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ProposalParams {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.alpha.is_zero() || self.alpha >= Fixed::ONE {
            return Err(GovernanceError::InvalidParameter(format!(
                "alpha must lie strictly between 0 and 1, got {}",
                self.alpha
            )));
        }
        if self.step_duration_secs == 0 {
            return Err(GovernanceError::InvalidParameter(
                "step duration must be at least one second".into(),
            ));
        }
        if self.weight_scaling_factor == 0 {
            return Err(GovernanceError::InvalidParameter(
                "weight scaling factor must be nonzero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ProposalParams {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            required_conviction: default_required_conviction(),
            step_duration_secs: default_step_duration_secs(),
            weight_scaling_factor: default_weight_scaling_factor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ProposalParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_alpha_at_either_bound() {
        for alpha in [Fixed::ZERO, Fixed::ONE, Fixed::from_int(2)] {
            let params = ProposalParams {
                alpha,
                ..ProposalParams::default()
            };
            assert!(matches!(
                params.validate(),
                Err(GovernanceError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn rejects_zero_step_and_zero_scaling() {
        let zero_step = ProposalParams {
            step_duration_secs: 0,
            ..ProposalParams::default()
        };
        assert!(zero_step.validate().is_err());

        let zero_scale = ProposalParams {
            weight_scaling_factor: 0,
            ..ProposalParams::default()
        };
        assert!(zero_scale.validate().is_err());
    }
}
