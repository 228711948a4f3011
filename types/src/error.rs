//! Errors raised while handling the shared scalar types.

use thiserror::Error;

/// Failure to parse a decimal string into a fixed-point value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseFixedError {
    #[error("malformed fixed-point value: {0:?}")]
    Malformed(String),

    #[error("more than 7 decimal places: {0:?}")]
    TooPrecise(String),

    #[error("negative value where an unsigned one is required: {0:?}")]
    Negative(String),

    #[error("value out of range: {0:?}")]
    OutOfRange(String),
}
