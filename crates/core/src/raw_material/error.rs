//! Raw-material transaction error types.

use thiserror::Error;

use crate::material::MaterialError;

/// Errors raised while validating or applying a raw-material transaction.
///
/// All of them are raised before any ledger write.
#[derive(Debug, Error)]
pub enum RawMaterialError {
    /// Quantity (bags or kg) must be positive.
    #[error("Quantity must be > 0 (bags or kg)")]
    NonPositiveQuantity,

    /// Purchases need a supplier.
    #[error("Supplier name is required for a purchase")]
    MissingSupplier,

    /// Sales need a receiving customer.
    #[error("Target customer is required for a sale")]
    MissingSaleCustomer,

    /// Transfers need both customers.
    #[error("Both from_customer and to_customer are required for a transfer")]
    MissingTransferEndpoint,

    /// Transfers must move material between two different customers.
    #[error("From/To customers must be different")]
    SameTransferEndpoints,

    /// Rates are never negative.
    #[error("Rate cannot be negative")]
    NegativeRate,

    /// Amounts are never negative.
    #[error("Amount cannot be negative")]
    NegativeAmount,

    /// Unknown transaction kind label.
    #[error("Unknown transaction kind: {0}")]
    UnknownKind(String),

    /// Ledger posting could not be built.
    #[error(transparent)]
    Material(#[from] MaterialError),
}

impl RawMaterialError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveQuantity => "NON_POSITIVE_QUANTITY",
            Self::MissingSupplier => "MISSING_SUPPLIER",
            Self::MissingSaleCustomer => "MISSING_SALE_CUSTOMER",
            Self::MissingTransferEndpoint => "MISSING_TRANSFER_ENDPOINT",
            Self::SameTransferEndpoints => "SAME_TRANSFER_ENDPOINTS",
            Self::NegativeRate => "NEGATIVE_RATE",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::UnknownKind(_) => "UNKNOWN_KIND",
            Self::Material(e) => e.error_code(),
        }
    }
}
