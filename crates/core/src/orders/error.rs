//! Order error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by order rules.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Unknown status label.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// Confirming needs the target weight to be covered by the customer's material.
    #[error("Insufficient raw material for this order. Required: {required} kg, Available: {available} kg")]
    InsufficientMaterial {
        /// Target weight of the order.
        required: Decimal,
        /// Customer balance available to the order.
        available: Decimal,
    },

    /// Produced weight deviates too far from the target.
    #[error("Produced {produced} kg deviates from target {target} kg by {deviation} kg. Tolerance: {tolerance} kg")]
    ToleranceExceeded {
        /// Produced weight.
        produced: Decimal,
        /// Target weight.
        target: Decimal,
        /// Absolute deviation.
        deviation: Decimal,
        /// Allowed deviation.
        tolerance: Decimal,
    },

    /// Roll weight below the minimum.
    #[error("Roll weight must be at least 0.001 kg (got {weight_kg} kg)")]
    RollTooLight {
        /// Rejected weight.
        weight_kg: Decimal,
    },

    /// A weight, price or tolerance was negative.
    #[error("{field} cannot be negative")]
    NegativeValue {
        /// Offending field.
        field: &'static str,
    },
}

impl OrderError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownStatus(_) => "UNKNOWN_STATUS",
            Self::InsufficientMaterial { .. } => "INSUFFICIENT_MATERIAL",
            Self::ToleranceExceeded { .. } => "TOLERANCE_EXCEEDED",
            Self::RollTooLight { .. } => "ROLL_TOO_LIGHT",
            Self::NegativeValue { .. } => "NEGATIVE_VALUE",
        }
    }
}
