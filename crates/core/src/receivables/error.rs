//! Receivables error types.

use polyroll_shared::types::Amount;
use thiserror::Error;

use crate::orders::OrderStatus;

/// Errors raised by payment and allocation rules.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Only billable orders can be settled.
    #[error("Order is {status}; only READY, DELIVERED or CLOSED orders can receive allocations")]
    OrderNotFinal {
        /// Current status of the order.
        status: OrderStatus,
    },

    /// Allocation cash is never negative.
    #[error("Allocation amount cannot be negative")]
    NegativeAmount,

    /// Allocation must move cash or apply a write-off.
    #[error("Allocation amount and rounding adjustment cannot both be zero")]
    EmptyAllocation,

    /// Rounding adjustment exceeds the configured cap.
    #[error("Rounding adjustment {rounding} exceeds ±{tolerance}")]
    RoundingOutOfBounds {
        /// Requested adjustment.
        rounding: Amount,
        /// Cap.
        tolerance: Amount,
    },

    /// Amount plus adjustment must not be negative.
    #[error("Effective allocation (amount + rounding adjustment) cannot be negative")]
    NegativeEffective,

    /// Payment does not have enough unapplied cash.
    #[error("Allocation {requested} exceeds the payment's unapplied amount {available}")]
    ExceedsUnapplied {
        /// Requested cash.
        requested: Amount,
        /// Unapplied cash excluding this allocation's prior value.
        available: Amount,
    },

    /// Order would be over-credited beyond the tolerance.
    #[error("Allocation {requested} exceeds the order's outstanding {outstanding} (+{tolerance} tolerance)")]
    ExceedsOutstanding {
        /// Requested amount plus adjustment.
        requested: Amount,
        /// Outstanding excluding this allocation's prior contribution.
        outstanding: Amount,
        /// Tolerance.
        tolerance: Amount,
    },

    /// Payments are never negative.
    #[error("Payment amount cannot be negative")]
    NegativePayment,

    /// Payment and order belong to different customers.
    #[error("Payment and order belong to different customers")]
    CustomerMismatch,

    /// Unknown payment method label.
    #[error("Unknown payment method: {0}")]
    UnknownMethod(String),
}

impl AllocationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::OrderNotFinal { .. } => "ORDER_NOT_FINAL",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::EmptyAllocation => "EMPTY_ALLOCATION",
            Self::RoundingOutOfBounds { .. } => "ROUNDING_OUT_OF_BOUNDS",
            Self::NegativeEffective => "NEGATIVE_EFFECTIVE",
            Self::ExceedsUnapplied { .. } => "EXCEEDS_UNAPPLIED",
            Self::ExceedsOutstanding { .. } => "EXCEEDS_OUTSTANDING",
            Self::NegativePayment => "NEGATIVE_PAYMENT",
            Self::CustomerMismatch => "CUSTOMER_MISMATCH",
            Self::UnknownMethod(_) => "UNKNOWN_METHOD",
        }
    }
}
