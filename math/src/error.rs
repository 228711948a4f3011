//! Conviction math errors.

use conviction_types::Fixed;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("decay factor must lie strictly between 0 and 1, got {0}")]
    InvalidAlpha(Fixed),

    #[error("arithmetic overflow in conviction computation")]
    Overflow,
}
