//! Allocation validation.
//!
//! An allocation is checked against two bounds at once: the payment's
//! unapplied cash and the order's outstanding balance (plus tolerance). Both
//! exclude the prior value of the (payment, order) row being written, so
//! adjusting an existing allocation is validated against its replacement.

use polyroll_shared::types::{Amount, OrderId, PaymentId};
use serde::{Deserialize, Serialize};

use super::error::AllocationError;
use super::types::PaymentAllocation;
use crate::orders::OrderStatus;

/// Values an allocation sets on its (payment, order) row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Cash applied.
    pub amount: Amount,
    /// Write-off applied.
    pub rounding_adjustment: Amount,
}

impl AllocationRequest {
    /// Cash-only allocation.
    #[must_use]
    pub const fn cash(amount: Amount) -> Self {
        Self {
            amount,
            rounding_adjustment: 0,
        }
    }

    /// `amount + rounding_adjustment`
    #[must_use]
    pub const fn effective(&self) -> Amount {
        self.amount + self.rounding_adjustment
    }
}

/// Everything an allocation is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationBounds {
    /// Status of the target order.
    pub order_status: OrderStatus,
    /// Grand total of the target order.
    pub order_grand_total: Amount,
    /// Amount of the payment.
    pub payment_amount: Amount,
    /// Σ amount of the payment's other allocations.
    pub other_cash_on_payment: Amount,
    /// Σ (amount + rounding) of the order's other allocations.
    pub other_effective_on_order: Amount,
    /// Cap for rounding adjustments and the outstanding overshoot.
    pub tolerance: Amount,
}

impl AllocationBounds {
    /// Derives the bounds from the existing rows of the payment and of the
    /// order, excluding the (payment, order) row itself.
    #[must_use]
    pub fn from_rows(
        payment_id: PaymentId,
        payment_amount: Amount,
        order_id: OrderId,
        order_status: OrderStatus,
        order_grand_total: Amount,
        allocations: &[PaymentAllocation],
        tolerance: Amount,
    ) -> Self {
        let is_pair = |a: &&PaymentAllocation| a.payment_id == payment_id && a.order_id == order_id;
        let other_cash_on_payment = allocations
            .iter()
            .filter(|a| a.payment_id == payment_id && !is_pair(a))
            .map(|a| a.amount)
            .sum();
        let other_effective_on_order = allocations
            .iter()
            .filter(|a| a.order_id == order_id && !is_pair(a))
            .map(PaymentAllocation::effective)
            .sum();
        Self {
            order_status,
            order_grand_total,
            payment_amount,
            other_cash_on_payment,
            other_effective_on_order,
            tolerance,
        }
    }

    /// Cash the payment can still give to this order.
    #[must_use]
    pub const fn payment_room(&self) -> Amount {
        self.payment_amount - self.other_cash_on_payment
    }

    /// Outstanding on the order before this allocation.
    #[must_use]
    pub const fn order_outstanding(&self) -> Amount {
        self.order_grand_total - self.other_effective_on_order
    }
}

/// Validates an allocation request.
///
/// 1. Order must be final
/// 2. `amount ≥ 0`, `|rounding| ≤ tolerance`, not both zero, effective ≥ 0
/// 3. `amount ≤ payment_room`
/// 4. `amount + rounding ≤ order_outstanding + tolerance`
///
/// # Errors
///
/// Returns the first `AllocationError` that applies.
pub fn validate_allocation(bounds: &AllocationBounds, request: AllocationRequest) -> Result<(), AllocationError> {
    if !bounds.order_status.is_final() {
        return Err(AllocationError::OrderNotFinal {
            status: bounds.order_status,
        });
    }

    if request.amount < 0 {
        return Err(AllocationError::NegativeAmount);
    }
    if request.rounding_adjustment.abs() > bounds.tolerance {
        return Err(AllocationError::RoundingOutOfBounds {
            rounding: request.rounding_adjustment,
            tolerance: bounds.tolerance,
        });
    }
    if request.amount == 0 && request.rounding_adjustment == 0 {
        return Err(AllocationError::EmptyAllocation);
    }
    if request.effective() < 0 {
        return Err(AllocationError::NegativeEffective);
    }

    let available = bounds.payment_room();
    if request.amount > available {
        return Err(AllocationError::ExceedsUnapplied {
            requested: request.amount,
            available,
        });
    }

    let outstanding = bounds.order_outstanding();
    if request.effective() > outstanding + bounds.tolerance {
        return Err(AllocationError::ExceedsOutstanding {
            requested: request.effective(),
            outstanding,
            tolerance: bounds.tolerance,
        });
    }

    Ok(())
}
