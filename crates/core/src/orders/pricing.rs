//! Order money derivation.
//!
//! Every total is a whole-unit integer; intermediate products stay in `Decimal`
//! and are converted once with half-up rounding.

use polyroll_shared::types::{Amount, amount_to_decimal, to_currency_int};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::Order;

/// Billed totals of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Weight billed.
    pub billable_kg: Decimal,
    /// `billable_kg × price_per_kg`
    pub subtotal: Amount,
    /// `subtotal × tax ratio`, zero without `include_tax`.
    pub tax: Amount,
    /// `subtotal + tax`
    pub grand_total: Amount,
}

impl OrderTotals {
    /// Computes the totals for an order with the configured tax ratio.
    #[must_use]
    pub fn compute(order: &Order, tax_ratio: Decimal) -> Self {
        let billable_kg = order.billable_kg();
        let subtotal = to_currency_int(billable_kg * order.price_per_kg);
        let tax = if order.include_tax {
            to_currency_int(amount_to_decimal(subtotal) * tax_ratio)
        } else {
            0
        };
        Self {
            billable_kg,
            subtotal,
            tax,
            grand_total: subtotal + tax,
        }
    }
}

/// How much of an order has been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderSettlement {
    /// Grand total of the order.
    pub grand_total: Amount,
    /// Σ allocation amounts.
    pub allocated: Amount,
    /// Σ rounding adjustments.
    pub adjustments: Amount,
}

impl OrderSettlement {
    /// Cash plus write-offs applied to the order.
    #[must_use]
    pub const fn effective_paid(&self) -> Amount {
        self.allocated + self.adjustments
    }

    /// `grand_total − effective_paid`
    #[must_use]
    pub const fn outstanding(&self) -> Amount {
        self.grand_total - self.effective_paid()
    }
}
