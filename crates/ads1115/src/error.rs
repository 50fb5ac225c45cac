//! Error types for the ADS1115 driver.

use thiserror::Error;

/// Which lookup table a rejected code was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeField {
    Gain,
    DataRate,
}

impl std::fmt::Display for CodeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gain => write!(f, "gain"),
            Self::DataRate => write!(f, "data rate"),
        }
    }
}

/// A gain or data-rate code outside the chip's 3-bit range.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeError {
    #[error("{field} code {code} out of range (0–7)")]
    OutOfRange { field: CodeField, code: i32 },
}

/// Errors returned by [`Ads1115`](crate::Ads1115).
///
/// Transport failures are passed through untouched; the driver never retries.
#[derive(Error, Debug)]
pub enum Error<E: std::error::Error + 'static> {
    #[error("I2C transport error: {0}")]
    Transport(#[source] E),
    #[error("conversion not ready after {attempts} poll(s) of the config register")]
    ConversionTimeout { attempts: u32 },
    #[error(transparent)]
    Code(CodeError),
}

impl<E: std::error::Error + 'static> From<CodeError> for Error<E> {
    fn from(e: CodeError) -> Self {
        Self::Code(e)
    }
}
