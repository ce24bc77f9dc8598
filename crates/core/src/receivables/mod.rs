//! Accounts receivable: payments, allocations and FIFO auto-allocation.

pub mod allocation;
pub mod error;
pub mod fifo;
pub mod release;
pub mod types;

#[cfg(test)]
mod allocation_props;

pub use allocation::{AllocationBounds, AllocationRequest, validate_allocation};
pub use error::AllocationError;
pub use fifo::{FifoStep, OpenInvoice, plan_fifo};
pub use release::{ReleaseStep, plan_release};
pub use types::{Payment, PaymentAllocation, PaymentMethod, unapplied_amount};

/// Validates a payment amount.
///
/// # Errors
///
/// Returns `AllocationError::NegativePayment` for a negative amount.
pub fn validate_payment_amount(amount: polyroll_shared::types::Amount) -> Result<(), AllocationError> {
    if amount < 0 {
        return Err(AllocationError::NegativePayment);
    }
    Ok(())
}
