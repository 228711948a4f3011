//! Ramp/plateau boundaries of linearly drifting quantities.

use crate::error::MathError;
use conviction_types::SignedFixed;

/// Number of whole steps for which `current + i * rate` has not yet moved
/// past `target`.
///
/// This is the split between the ramp regime (the quantity still drifts
/// linearly) and the plateau regime (the quantity sits at `target`), so a
/// window of any length can be evaluated in two closed-form phases.
///
/// - zero `rate`: `None`, the target is never reached;
/// - `current` already at `target`, or past it in the direction of travel:
///   `Some(0)`.
///
/// Saturates at `u64::MAX` for targets further away than any step count.
pub fn max_conviction_step(
    current: SignedFixed,
    target: SignedFixed,
    rate: SignedFixed,
) -> Option<u64> {
    if rate.is_zero() {
        return None;
    }
    let gap = target.raw().saturating_sub(current.raw());
    if gap == 0 || (gap > 0) != (rate.raw() > 0) {
        return Some(0);
    }
    let steps = gap.unsigned_abs() / rate.raw().unsigned_abs();
    Some(u64::try_from(steps).unwrap_or(u64::MAX))
}

/// `x0 + steps * rate`: a drifting quantity rolled forward.
pub fn drift(x0: SignedFixed, rate: SignedFixed, steps: u64) -> Result<SignedFixed, MathError> {
    rate.checked_mul_steps(steps)
        .and_then(|delta| x0.checked_add(delta))
        .ok_or(MathError::Overflow)
}
