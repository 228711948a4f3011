//! Engine configuration with TOML file support.

use serde::{Deserialize, Serialize};

use conviction_math::RampPolicy;
use conviction_types::AccountId;

use crate::error::GovernanceError;
use crate::logging::LogFormat;
use crate::params::ProposalParams;

/// Configuration for a [`ConvictionEngine`](crate::ConvictionEngine).
///
/// Can be loaded from a TOML file via [`ConvictionConfig::from_toml_file`]
/// or built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvictionConfig {
    /// Whether a drifting aggregate weight may go below zero.
    #[serde(default)]
    pub ramp_policy: RampPolicy,

    /// Pass a proposal on the highest conviction inside the window just
    /// synced rather than only on the value at its end.
    #[serde(default = "default_true")]
    pub evaluate_window_peak: bool,

    /// The only sender accepted by the account-state hook.
    #[serde(default = "default_trusted_ledger")]
    pub trusted_ledger: AccountId,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Parameters offered to proposal creators that do not bring their own.
    #[serde(default)]
    pub default_params: ProposalParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_trusted_ledger() -> AccountId {
    AccountId::new("account-ledger")
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ConvictionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, GovernanceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GovernanceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self = toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))?;
        config.default_params.validate().map_err(|e| {
            GovernanceError::Config(format!("default_params: {e}"))
        })?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::Config(e.to_string()))
    }
}

impl Default for ConvictionConfig {
    fn default() -> Self {
        Self {
            ramp_policy: RampPolicy::default(),
            evaluate_window_peak: default_true(),
            trusted_ledger: default_trusted_ledger(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            default_params: ProposalParams::default(),
        }
    }
}
