//! Conviction math: how support accumulates under exponential decay.
//!
//! Each step, conviction decays by `alpha` and gains the current input:
//! `C_i = alpha * C_{i-1} + x_i`. Inputs drift linearly when voters' balances
//! stream in or out, so `x_i = x0 + i * r`.
//!
//! This crate evaluates that recurrence in closed form:
//! - [`accumulate`]: conviction after `n` steps
//! - [`peak_conviction`] / [`peak_step`]: highest point inside a window
//! - [`max_conviction_step`]: where a drifting input crosses a target
//! - [`RampPolicy`]: whether inputs may go negative or stop at zero

pub mod boundary;
pub mod conviction;
pub mod error;
pub mod policy;
pub mod precision;

pub use boundary::{drift, max_conviction_step};
pub use conviction::{
    accumulate, accumulate_signed, peak_conviction, peak_step, reference_trajectory, Peak,
};
pub use error::MathError;
pub use policy::RampPolicy;
pub use precision::{mul_div, Decay, PRECISION};
