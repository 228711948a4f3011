//! Conviction simulator: evaluate the decay recurrence for a parameter set.

use anyhow::Context;
use clap::Parser;
use conviction_governance::{init_logging, ConvictionConfig, LogFormat};
use conviction_math::{
    accumulate_signed, max_conviction_step, peak_conviction, reference_trajectory, RampPolicy,
};
use conviction_types::{Fixed, SignedFixed};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "conviction-sim", about = "Conviction voting trajectory simulator")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Defaults to the config file's value.
    #[arg(long, env = "CONVICTION_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "CONVICTION_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. Its ramp policy and default
    /// proposal parameters are used unless overridden by flags.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print conviction step by step, iterated and in closed form.
    Trajectory {
        /// Retention per step, e.g. 0.9.
        #[arg(long)]
        alpha: Option<Fixed>,

        /// Conviction at step 0.
        #[arg(long, default_value = "0")]
        start: Fixed,

        /// Aggregate weight at step 0.
        #[arg(long, allow_hyphen_values = true)]
        weight: SignedFixed,

        /// Weight change per step.
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        rate: SignedFixed,

        /// Number of steps to evaluate.
        #[arg(long, default_value_t = 10)]
        steps: u64,

        /// Clamp the drifting weight at zero.
        #[arg(long)]
        floor_at_zero: bool,
    },
    /// Print the step at which a drifting weight reaches a target.
    Boundary {
        #[arg(long, allow_hyphen_values = true)]
        current: SignedFixed,

        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        target: SignedFixed,

        #[arg(long, allow_hyphen_values = true)]
        rate: SignedFixed,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => ConvictionConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ConvictionConfig::default(),
    };
    init_logging(
        cli.log_format.unwrap_or(config.log_format),
        cli.log_level.as_deref().unwrap_or(&config.log_level),
    )
    .context("installing the log subscriber")?;
    if let Some(ref path) = cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Trajectory {
            alpha,
            start,
            weight,
            rate,
            steps,
            floor_at_zero,
        } => {
            let alpha = alpha.unwrap_or(config.default_params.alpha);
            let policy = if floor_at_zero {
                RampPolicy::FloorAtZero
            } else {
                config.ramp_policy
            };
            print_trajectory(alpha, start, weight, rate, steps, policy)
        }
        Command::Boundary {
            current,
            target,
            rate,
        } => {
            match max_conviction_step(current, target, rate) {
                Some(step) => println!("boundary after {step} steps"),
                None => println!("never reached: zero rate"),
            }
            Ok(())
        }
    }
}

fn print_trajectory(
    alpha: Fixed,
    start: Fixed,
    weight: SignedFixed,
    rate: SignedFixed,
    steps: u64,
    policy: RampPolicy,
) -> anyhow::Result<()> {
    tracing::debug!(%alpha, %start, %weight, %rate, steps, ?policy, "evaluating trajectory");
    let iterated = reference_trajectory(start, weight, rate, alpha, steps, policy)
        .context("iterating the recurrence")?;

    println!("{:>8}  {:>20}  {:>20}  {:>6}", "step", "iterated", "closed form", "ulps");
    println!("{:>8}  {:>20}  {:>20}  {:>6}", 0, start.to_string(), start.to_string(), 0);
    for (step, value) in (1..=steps).zip(&iterated) {
        let closed = accumulate_signed(start, weight, rate, alpha, step, policy)
            .with_context(|| format!("closed form at step {step}"))?;
        let ulps = closed.raw().abs_diff(value.raw());
        println!(
            "{step:>8}  {:>20}  {:>20}  {ulps:>6}",
            value.to_string(),
            closed.to_string()
        );
    }

    let peak = peak_conviction(start, weight, rate, alpha, steps, policy)
        .context("locating the window peak")?;
    println!("peak {} at step {}", peak.conviction, peak.step);
    Ok(())
}
