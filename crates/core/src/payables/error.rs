//! Accounts payable error types.

use thiserror::Error;

use crate::raw_material::TxnKind;

/// Errors raised by supplier payment rules.
#[derive(Debug, Error)]
pub enum PayablesError {
    /// Only purchases can be paid to a supplier.
    #[error("Supplier payments can only be linked to purchases, not {0}")]
    NotAPurchase(TxnKind),

    /// Payment amount is negative.
    #[error("Supplier payment amount must be non-negative")]
    NegativePayment,

    /// Supplier name is blank.
    #[error("Supplier name is required")]
    MissingSupplier,
}

impl PayablesError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotAPurchase(_) => "NOT_A_PURCHASE",
            Self::NegativePayment => "NEGATIVE_PAYMENT",
            Self::MissingSupplier => "MISSING_SUPPLIER",
        }
    }
}
