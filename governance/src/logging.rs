//! Subscriber setup for hosts embedding the engine.
//!
//! The engine itself only emits `tracing` events: proposal creation and
//! passing at `info`, votes, syncs and account resyncs at `debug`, and
//! rejected operations at `warn`, each carrying `resource` and `proposal`
//! fields. Hosts that have no subscriber of their own install one here,
//! with the format and level usually taken from [`ConvictionConfig`].
//! `RUST_LOG` overrides the level when set.
//!
//! [`ConvictionConfig`]: crate::config::ConvictionConfig

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Selects the output format for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format {other:?}, expected human or json")),
        }
    }
}

/// Install the global subscriber. Fails if the process already has one.
pub fn init_logging(format: LogFormat, level: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Human => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false).with_target(true))
            .try_init(),
    }
}
