//! Extended-precision fixed-point arithmetic.
//!
//! Public values carry 7 decimals ([`DENOMINATOR`]). Inside the closed forms
//! every quantity is lifted to 18 decimals ([`PRECISION`]) and truncated back
//! exactly once, at the end.
//!
//! Error bound of [`Decay::pow`]: every multiplication truncates by less than
//! one unit of 10^-18, and `alpha^n` for a 64-bit `n` takes at most 128
//! multiplications, so the absolute error stays below 1.3·10^-16, nine
//! orders of magnitude below the 10^-7 public resolution.

use crate::error::MathError;
use conviction_types::{Fixed, DENOMINATOR};

/// One unit at extended precision.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Ratio between extended and public precision.
pub const LIFT: u128 = PRECISION / DENOMINATOR;

/// `floor(a * b / c)` without overflowing when `a * b` does not fit.
///
/// Exact as long as `(a / c) * b` and `c * b` fit in a `u128`.
pub fn mul_div(a: u128, b: u128, c: u128) -> Result<u128, MathError> {
    if c == 0 {
        return Err(MathError::Overflow);
    }
    let whole = (a / c).checked_mul(b).ok_or(MathError::Overflow)?;
    let part = (a % c).checked_mul(b).ok_or(MathError::Overflow)? / c;
    whole.checked_add(part).ok_or(MathError::Overflow)
}

/// Attach the sign of `sign_of` to `magnitude`.
pub(crate) fn with_sign(sign_of: i128, magnitude: u128) -> Result<i128, MathError> {
    let value = i128::try_from(magnitude).map_err(|_| MathError::Overflow)?;
    Ok(if sign_of < 0 { -value } else { value })
}

/// Lift a public raw value to extended precision.
pub(crate) fn lift(raw: u128) -> Result<u128, MathError> {
    raw.checked_mul(LIFT).ok_or(MathError::Overflow)
}

/// A validated decay factor held at extended precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decay {
    alpha: Fixed,
    alpha_ext: u128,
    one_minus_ext: u128,
}

impl Decay {
    /// Fails unless `0 < alpha < 1`.
    pub fn new(alpha: Fixed) -> Result<Self, MathError> {
        if alpha.is_zero() || alpha >= Fixed::ONE {
            return Err(MathError::InvalidAlpha(alpha));
        }
        let alpha_ext = lift(alpha.raw())?;
        Ok(Self {
            alpha,
            alpha_ext,
            one_minus_ext: PRECISION - alpha_ext,
        })
    }

    pub fn alpha(&self) -> Fixed {
        self.alpha
    }

    pub(crate) fn one_minus_ext(&self) -> u128 {
        self.one_minus_ext
    }

    /// `alpha^n` at extended precision, by repeated squaring.
    pub fn pow(&self, n: u64) -> u128 {
        let mut result = PRECISION;
        let mut base = self.alpha_ext;
        let mut exp = n;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result * base / PRECISION;
                if result == 0 {
                    return 0;
                }
            }
            exp >>= 1;
            if exp > 0 {
                base = base * base / PRECISION;
                if base == 0 {
                    return 0;
                }
            }
        }
        result
    }

    /// `alpha^n` truncated to public precision.
    pub fn pow_fixed(&self, n: u64) -> Fixed {
        Fixed::from_raw(self.pow(n) / LIFT)
    }

    /// `S_n = Σ_{k=0}^{n-1} alpha^k = (1 - alpha^n) / (1 - alpha)` at extended
    /// precision, given `alpha^n` from [`Decay::pow`].
    pub(crate) fn geometric_sum(&self, alpha_n: u128) -> Result<u128, MathError> {
        mul_div(PRECISION - alpha_n, PRECISION, self.one_minus_ext)
    }

    /// `Σ_{i=1}^{n} alpha^{n-i} * i = (n - alpha * S_n) / (1 - alpha)` at
    /// extended precision, given `S_n` from [`Decay::geometric_sum`].
    pub(crate) fn ramp_sum(&self, n: u64, sum: u128) -> Result<u128, MathError> {
        let linear = u128::from(n)
            .checked_mul(PRECISION)
            .ok_or(MathError::Overflow)?;
        let decayed = mul_div(sum, self.alpha_ext, PRECISION)?;
        mul_div(
            linear.saturating_sub(decayed),
            PRECISION,
            self.one_minus_ext,
        )
    }
}
