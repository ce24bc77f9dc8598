//! Material ledger error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by material ledger rules and receipts.
#[derive(Debug, Error)]
pub enum MaterialError {
    /// A ledger posting must move some material.
    #[error("Ledger posting must have a non-zero delta")]
    ZeroDelta,

    /// Period bounds are reversed.
    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod {
        /// Period start.
        start: NaiveDate,
        /// Period end.
        end: NaiveDate,
    },

    /// A regular receipt must bring in material.
    #[error("Material receipt must be > 0 kg (got {total_kg} kg). For negatives, mark it as an opening adjustment")]
    ReceiptNotPositive {
        /// Computed receipt total.
        total_kg: Decimal,
    },

    /// Opening adjustments may be negative but never zero.
    #[error("Opening adjustment total cannot be 0 kg")]
    ZeroAdjustment,

    /// Unknown entry type or material kind label.
    #[error("Unknown value: {0}")]
    UnknownValue(String),
}

impl MaterialError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroDelta => "ZERO_DELTA",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::ReceiptNotPositive { .. } => "RECEIPT_NOT_POSITIVE",
            Self::ZeroAdjustment => "ZERO_ADJUSTMENT",
            Self::UnknownValue(_) => "UNKNOWN_VALUE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(MaterialError::ZeroDelta.error_code(), "ZERO_DELTA");
        assert_eq!(MaterialError::ZeroAdjustment.error_code(), "ZERO_ADJUSTMENT");
        assert_eq!(
            MaterialError::ReceiptNotPositive {
                total_kg: Decimal::ZERO
            }
            .error_code(),
            "RECEIPT_NOT_POSITIVE"
        );
    }
}
