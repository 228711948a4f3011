//! Closed-form evaluation of the conviction recurrence.
//!
//! Conviction evolves once per step as `C_i = alpha * C_{i-1} + x_i` with a
//! linearly drifting input `x_i = x0 + i * r`. Over `n` steps this unrolls to
//!
//! ```text
//! C_n = alpha^n * y0                          (homogeneous)
//!     + x0 * (1 - alpha^n) / (1 - alpha)      (constant input)
//!     + r * (n - alpha * S_n) / (1 - alpha)   (ramp input)
//! ```
//!
//! with `S_n = (1 - alpha^n) / (1 - alpha)`. Each evaluation costs
//! O(log n) multiplications however long the window is.

use crate::boundary::max_conviction_step;
use crate::error::MathError;
use crate::policy::RampPolicy;
use crate::precision::{lift, mul_div, with_sign, Decay, LIFT, PRECISION};
use conviction_types::{Fixed, SignedFixed, DENOMINATOR};

/// The highest conviction reached inside a window, and where.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Peak {
    /// Steps after the window start; 0 means the starting value.
    pub step: u64,
    pub conviction: Fixed,
}

/// Conviction after `n` steps starting from `y0`, floored at zero.
pub fn accumulate(
    y0: Fixed,
    x0: SignedFixed,
    r: SignedFixed,
    alpha: Fixed,
    n: u64,
    policy: RampPolicy,
) -> Result<Fixed, MathError> {
    Ok(accumulate_signed(y0, x0, r, alpha, n, policy)?.floor_at_zero())
}

/// Like [`accumulate`] but without the final floor, so a ramp that drives the
/// trajectory below zero is visible.
pub fn accumulate_signed(
    y0: Fixed,
    x0: SignedFixed,
    r: SignedFixed,
    alpha: Fixed,
    n: u64,
    policy: RampPolicy,
) -> Result<SignedFixed, MathError> {
    let decay = Decay::new(alpha)?;
    let start = lift_signed(y0)?;
    let end = trajectory(&decay, start, x0.raw(), r.raw(), n, policy)?;
    Ok(lower(end))
}

/// Highest conviction over steps `0..=n`.
///
/// A falling input (`r < 0`) makes the trajectory rise and then fall, so its
/// maximum can sit strictly inside the window. The turning point is where the
/// per-step increment `Δ_i = alpha^{i-1} * Δ_1 + r * S_{i-1}` stops being
/// positive; `Δ` is monotone, so it is found by bisection in O(log² n).
pub fn peak_conviction(
    y0: Fixed,
    x0: SignedFixed,
    r: SignedFixed,
    alpha: Fixed,
    n: u64,
    policy: RampPolicy,
) -> Result<Peak, MathError> {
    let decay = Decay::new(alpha)?;
    let start = lift_signed(y0)?;
    let (x0, r) = (x0.raw(), r.raw());

    let horizon = match policy {
        RampPolicy::Unbounded => n,
        RampPolicy::FloorAtZero if r < 0 && x0 > 0 => zero_boundary(x0, r).min(n),
        RampPolicy::FloorAtZero if r < 0 => 0,
        RampPolicy::FloorAtZero => n,
    };

    let mut best = (0, start);
    let interior = turning_point(&decay, start, x0, r, horizon)?;
    for step in interior.into_iter().chain(std::iter::once(n)) {
        let value = trajectory(&decay, start, x0, r, step, policy)?;
        if value > best.1 {
            best = (step, value);
        }
    }
    Ok(Peak {
        step: best.0,
        conviction: lower(best.1).floor_at_zero(),
    })
}

/// Step index of the highest conviction over `0..=n`.
pub fn peak_step(
    y0: Fixed,
    x0: SignedFixed,
    r: SignedFixed,
    alpha: Fixed,
    n: u64,
    policy: RampPolicy,
) -> Result<u64, MathError> {
    Ok(peak_conviction(y0, x0, r, alpha, n, policy)?.step)
}

/// Step-by-step evaluation at public precision, truncating every step.
///
/// O(n); for cross-checking the closed form and for printing trajectories.
pub fn reference_trajectory(
    y0: Fixed,
    x0: SignedFixed,
    r: SignedFixed,
    alpha: Fixed,
    n: u64,
    policy: RampPolicy,
) -> Result<Vec<SignedFixed>, MathError> {
    let decay = Decay::new(alpha)?;
    let alpha = i128::try_from(decay.alpha().raw()).map_err(|_| MathError::Overflow)?;
    let mut current = i128::try_from(y0.raw()).map_err(|_| MathError::Overflow)?;
    let mut values = Vec::new();
    for i in 1..=n {
        let mut input = r
            .raw()
            .checked_mul(i128::from(i))
            .and_then(|ramp| ramp.checked_add(x0.raw()))
            .ok_or(MathError::Overflow)?;
        if policy == RampPolicy::FloorAtZero {
            input = input.max(0);
        }
        current = current
            .checked_mul(alpha)
            .map(|decayed| decayed / DENOMINATOR as i128)
            .and_then(|decayed| decayed.checked_add(input))
            .ok_or(MathError::Overflow)?;
        values.push(SignedFixed::from_raw(current));
    }
    Ok(values)
}

// ── Extended-precision internals ──────────────────────────────────────────

fn lift_signed(value: Fixed) -> Result<i128, MathError> {
    with_sign(1, lift(value.raw())?)
}

/// Back to public precision, truncating toward zero.
fn lower(ext: i128) -> SignedFixed {
    SignedFixed::from_raw(ext / LIFT as i128)
}

/// Steps for which `x0 + i * r` stays on the starting side of zero.
fn zero_boundary(x0: i128, r: i128) -> u64 {
    max_conviction_step(
        SignedFixed::from_raw(x0),
        SignedFixed::ZERO,
        SignedFixed::from_raw(r),
    )
    .unwrap_or(u64::MAX)
}

/// `C_n` under `policy`, at extended precision. `start` is extended; `x0`
/// and `r` are public raw values.
fn trajectory(
    decay: &Decay,
    start: i128,
    x0: i128,
    r: i128,
    n: u64,
    policy: RampPolicy,
) -> Result<i128, MathError> {
    match policy {
        RampPolicy::Unbounded => unrolled(decay, start, x0, r, n),
        RampPolicy::FloorAtZero if x0 >= 0 && r >= 0 => unrolled(decay, start, x0, r, n),
        RampPolicy::FloorAtZero if x0 <= 0 && r <= 0 => unrolled(decay, start, 0, 0, n),
        RampPolicy::FloorAtZero => {
            let split = zero_boundary(x0, r).min(n);
            if r < 0 {
                // Ramp down to zero, then pure decay.
                let at_split = unrolled(decay, start, x0, r, split)?;
                unrolled(decay, at_split, 0, 0, n - split)
            } else {
                // Clamped at zero until the ramp climbs out.
                let at_split = unrolled(decay, start, 0, 0, split)?;
                let base = i128::try_from(split)
                    .ok()
                    .and_then(|steps| r.checked_mul(steps))
                    .and_then(|climb| x0.checked_add(climb))
                    .ok_or(MathError::Overflow)?;
                unrolled(decay, at_split, base, r, n - split)
            }
        }
    }
}

/// The three-term closed form without any clamping.
fn unrolled(decay: &Decay, start: i128, x0: i128, r: i128, n: u64) -> Result<i128, MathError> {
    let alpha_n = decay.pow(n);
    let homogeneous = with_sign(start, mul_div(start.unsigned_abs(), alpha_n, PRECISION)?)?;
    if x0 == 0 && r == 0 {
        return Ok(homogeneous);
    }

    let sum = decay.geometric_sum(alpha_n)?;
    let constant = with_sign(x0, mul_div(sum, x0.unsigned_abs(), DENOMINATOR)?)?;
    let ramp = if r == 0 {
        0
    } else {
        let ramp_sum = decay.ramp_sum(n, sum)?;
        with_sign(r, mul_div(ramp_sum, r.unsigned_abs(), DENOMINATOR)?)?
    };

    homogeneous
        .checked_add(constant)
        .and_then(|partial| partial.checked_add(ramp))
        .ok_or(MathError::Overflow)
}

/// Last step in `1..=horizon` whose increment is still positive, if the
/// trajectory turns inside the horizon at all.
fn turning_point(
    decay: &Decay,
    start: i128,
    x0: i128,
    r: i128,
    horizon: u64,
) -> Result<Option<u64>, MathError> {
    if r >= 0 || horizon == 0 {
        return Ok(None);
    }

    // Δ_1 = x0 + r - (1 - alpha) * y0
    let leak = with_sign(
        start,
        mul_div(start.unsigned_abs(), decay.one_minus_ext(), PRECISION)?,
    )?;
    let first = with_sign(x0, lift(x0.unsigned_abs())?)?
        .checked_add(with_sign(r, lift(r.unsigned_abs())?)?)
        .and_then(|input| input.checked_sub(leak))
        .ok_or(MathError::Overflow)?;
    if first <= 0 {
        return Ok(None);
    }
    let first = first.unsigned_abs();
    let pull_rate = r.unsigned_abs();

    let rising = |step: u64| -> Result<bool, MathError> {
        let alpha_k = decay.pow(step - 1);
        let carried = mul_div(first, alpha_k, PRECISION)?;
        let pull = mul_div(decay.geometric_sum(alpha_k)?, pull_rate, DENOMINATOR)?;
        Ok(carried > pull)
    };

    if rising(horizon)? {
        return Ok(Some(horizon));
    }
    let (mut lo, mut hi) = (1u64, horizon);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if rising(mid)? {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(Some(lo))
}
