//! Weight normalization.
//!
//! Weights are kilograms with exactly three fractional digits. They are
//! persisted as whole grams so that summation never leaves integer arithmetic.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Quantizes a weight to kilograms with three fractional digits, rounding half-up.
#[must_use]
pub fn to_weight_kg(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(3);
    rounded
}

/// Converts kilograms into persisted grams after normalization.
#[must_use]
pub fn grams_from_kg(kg: Decimal) -> i64 {
    let grams = to_weight_kg(kg) * Decimal::ONE_THOUSAND;
    grams.to_i64().unwrap_or(if grams.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Restores kilograms from persisted grams.
#[must_use]
pub fn kg_from_grams(grams: i64) -> Decimal {
    Decimal::new(grams, 3)
}

/// Formats a weight as kilograms with three decimals.
#[must_use]
pub fn format_kg(kg: Decimal) -> String {
    to_weight_kg(kg).to_string()
}
