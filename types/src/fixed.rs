//! Fixed-point scalars shared by every conviction computation.
//!
//! Percentages, decay factors, weights and convictions all use one scale:
//! a raw integer over [`DENOMINATOR`] (10^7). `1.0` is `10_000_000` raw.
//! Division truncates toward zero, never rounds.
//!
//! Human-readable serializers (TOML, JSON) see a decimal string such as
//! `"0.9"`; binary serializers (bincode) see the raw integer.

use crate::error::ParseFixedError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Denominator of every fixed-point value.
pub const DENOMINATOR: u128 = 10_000_000;

/// Number of decimal digits carried by [`DENOMINATOR`].
pub const DECIMALS: usize = 7;

/// Non-negative fixed-point value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(u128);

impl Fixed {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(DENOMINATOR);

    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole units, e.g. `from_int(3)` is `3.0`.
    pub const fn from_int(units: u64) -> Self {
        Self(units as u128 * DENOMINATOR)
    }

    /// `numerator / denominator`, truncated. `None` on a zero denominator
    /// or overflow.
    pub fn from_ratio(numerator: u128, denominator: u128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        numerator
            .checked_mul(DENOMINATOR)
            .map(|scaled| Self(scaled / denominator))
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Fixed-point product, truncated.
    pub fn checked_mul(self, other: Self) -> Option<Self> {
        self.0
            .checked_mul(other.0)
            .map(|product| Self(product / DENOMINATOR))
    }

    pub fn to_signed(self) -> Option<SignedFixed> {
        i128::try_from(self.0).ok().map(SignedFixed)
    }
}

impl Add for Fixed {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Fixed {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_decimal(f, false, self.0)
    }
}

impl FromStr for Fixed {
    type Err = ParseFixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, raw) = parse_decimal(s)?;
        if negative && raw != 0 {
            return Err(ParseFixedError::Negative(s.to_string()));
        }
        Ok(Self(raw))
    }
}

/// Signed fixed-point value, for flows and weight deltas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedFixed(i128);

impl SignedFixed {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(DENOMINATOR as i128);

    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> i128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// `self * steps`, for rolling a per-step rate forward.
    pub fn checked_mul_steps(self, steps: u64) -> Option<Self> {
        self.0.checked_mul(i128::from(steps)).map(Self)
    }

    /// Clamp to the non-negative range.
    pub fn floor_at_zero(self) -> Fixed {
        if self.0 <= 0 {
            Fixed::ZERO
        } else {
            Fixed(self.0 as u128)
        }
    }
}

impl Add for SignedFixed {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for SignedFixed {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl From<Fixed> for SignedFixed {
    /// Saturates at `i128::MAX`; no conviction quantity gets near it.
    fn from(value: Fixed) -> Self {
        Self(i128::try_from(value.0).unwrap_or(i128::MAX))
    }
}

impl fmt::Display for SignedFixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_decimal(f, self.0 < 0, self.0.unsigned_abs())
    }
}

impl FromStr for SignedFixed {
    type Err = ParseFixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, raw) = parse_decimal(s)?;
        let magnitude =
            i128::try_from(raw).map_err(|_| ParseFixedError::OutOfRange(s.to_string()))?;
        Ok(Self(if negative { -magnitude } else { magnitude }))
    }
}

fn write_decimal(f: &mut fmt::Formatter<'_>, negative: bool, raw: u128) -> fmt::Result {
    let sign = if negative { "-" } else { "" };
    let int = raw / DENOMINATOR;
    let frac = raw % DENOMINATOR;
    if frac == 0 {
        return write!(f, "{sign}{int}");
    }
    let digits = format!("{frac:0width$}", width = DECIMALS);
    write!(f, "{sign}{int}.{}", digits.trim_end_matches('0'))
}

/// Parse `[-]int[.frac]` into a sign and a raw magnitude.
fn parse_decimal(s: &str) -> Result<(bool, u128), ParseFixedError> {
    let trimmed = s.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ParseFixedError::Malformed(s.to_string()));
    }
    if frac_part.len() > DECIMALS {
        return Err(ParseFixedError::TooPrecise(s.to_string()));
    }
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(ParseFixedError::Malformed(s.to_string()));
    }

    let int: u128 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|_| ParseFixedError::OutOfRange(s.to_string()))?
    };
    let frac: u128 = if frac_part.is_empty() {
        0
    } else {
        let padded = format!("{frac_part:0<width$}", width = DECIMALS);
        padded
            .parse()
            .map_err(|_| ParseFixedError::Malformed(s.to_string()))?
    };
    let raw = int
        .checked_mul(DENOMINATOR)
        .and_then(|scaled| scaled.checked_add(frac))
        .ok_or_else(|| ParseFixedError::OutOfRange(s.to_string()))?;
    Ok((negative, raw))
}

// ── Serde ─────────────────────────────────────────────────────────────────

impl Serialize for Fixed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_u128(self.0)
        }
    }
}

impl Serialize for SignedFixed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_i128(self.0)
        }
    }
}

/// Accepts a decimal string or whole-unit integer from human-readable
/// formats and the raw integer from binary ones.
struct FixedVisitor<T> {
    human: bool,
    marker: PhantomData<T>,
}

impl<T> FixedVisitor<T> {
    fn new(human: bool) -> Self {
        Self {
            human,
            marker: PhantomData,
        }
    }

    fn scale(&self) -> u128 {
        if self.human {
            DENOMINATOR
        } else {
            1
        }
    }
}

impl<'de> Visitor<'de> for FixedVisitor<Fixed> {
    type Value = Fixed;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative decimal string or integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Fixed, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Fixed, E> {
        let v = u64::try_from(v).map_err(|_| E::custom("negative value for unsigned fixed-point"))?;
        self.visit_u64(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Fixed, E> {
        Ok(Fixed(u128::from(v) * self.scale()))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Fixed, E> {
        v.checked_mul(self.scale())
            .map(Fixed)
            .ok_or_else(|| E::custom("fixed-point value out of range"))
    }
}

impl<'de> Visitor<'de> for FixedVisitor<SignedFixed> {
    type Value = SignedFixed;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SignedFixed, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<SignedFixed, E> {
        Ok(SignedFixed(i128::from(v) * self.scale() as i128))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<SignedFixed, E> {
        Ok(SignedFixed(i128::from(v) * self.scale() as i128))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<SignedFixed, E> {
        v.checked_mul(self.scale() as i128)
            .map(SignedFixed)
            .ok_or_else(|| E::custom("fixed-point value out of range"))
    }
}

impl<'de> Deserialize<'de> for Fixed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(FixedVisitor::<Fixed>::new(true))
        } else {
            deserializer.deserialize_u128(FixedVisitor::<Fixed>::new(false))
        }
    }
}

impl<'de> Deserialize<'de> for SignedFixed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(FixedVisitor::<SignedFixed>::new(true))
        } else {
            deserializer.deserialize_i128(FixedVisitor::<SignedFixed>::new(false))
        }
    }
}
