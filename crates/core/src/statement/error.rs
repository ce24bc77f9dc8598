//! Statement and export error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::material::MaterialError;

/// Errors raised while building a period statement.
#[derive(Debug, Error)]
pub enum StatementError {
    /// Period bounds are reversed.
    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod {
        /// Period start.
        start: NaiveDate,
        /// Period end.
        end: NaiveDate,
    },

    /// The period starts on the first representable date.
    #[error("Period start {0} has no preceding day")]
    DateOutOfRange(NaiveDate),

    /// Material section could not be computed.
    #[error(transparent)]
    Material(#[from] MaterialError),
}

impl StatementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::DateOutOfRange(_) => "DATE_OUT_OF_RANGE",
            Self::Material(e) => e.error_code(),
        }
    }
}

/// Errors raised while writing the customer balances CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Csv(_) => "CSV_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }
}
