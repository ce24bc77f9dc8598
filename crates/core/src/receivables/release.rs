//! Releasing cash from orders that can no longer carry it.
//!
//! An order that leaves the final states gives back every allocation. A final
//! order whose grand total dropped keeps at most `grand_total + tolerance`
//! of effective credit; the newest allocations are trimmed first and lose
//! their write-off.

use polyroll_shared::types::{AllocationId, Amount};
use serde::{Deserialize, Serialize};

use super::types::PaymentAllocation;
use crate::orders::OrderStatus;

/// A change to one existing allocation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseStep {
    /// Delete the row.
    Remove(AllocationId),
    /// Keep the row with less cash and no write-off.
    Trim {
        /// Row to update.
        id: AllocationId,
        /// Remaining cash.
        amount: Amount,
    },
}

impl ReleaseStep {
    /// Row the step applies to.
    #[must_use]
    pub const fn allocation_id(&self) -> AllocationId {
        match self {
            Self::Remove(id) | Self::Trim { id, .. } => *id,
        }
    }
}

/// Plans the changes that bring an order's allocations back within bounds.
///
/// `allocations` are the rows of a single order. Returns no steps when the
/// order is final and its effective credit fits.
#[must_use]
pub fn plan_release(
    status: OrderStatus,
    grand_total: Amount,
    tolerance: Amount,
    allocations: &[PaymentAllocation],
) -> Vec<ReleaseStep> {
    if !status.is_final() {
        return allocations.iter().map(|a| ReleaseStep::Remove(a.id)).collect();
    }

    let credited: Amount = allocations.iter().map(PaymentAllocation::effective).sum();
    let mut excess = credited - (grand_total + tolerance);
    if excess <= 0 {
        return Vec::new();
    }

    let mut newest_first: Vec<&PaymentAllocation> = allocations.iter().collect();
    newest_first.sort_by_key(|a| std::cmp::Reverse((a.applied_on, a.id)));

    let mut steps = Vec::new();
    for allocation in newest_first {
        if excess <= 0 {
            break;
        }
        // Dropping the write-off comes first; a negative one adds to the excess.
        excess -= allocation.rounding_adjustment;
        let cut = allocation.amount.min(excess.max(0));
        excess -= cut;

        let amount = allocation.amount - cut;
        steps.push(if amount == 0 {
            ReleaseStep::Remove(allocation.id)
        } else {
            ReleaseStep::Trim {
                id: allocation.id,
                amount,
            }
        });
    }

    tracing::debug!(credited, grand_total, tolerance, steps = steps.len(), "planned allocation release");
    steps
}
