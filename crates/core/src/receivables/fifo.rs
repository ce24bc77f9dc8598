//! FIFO auto-allocation planning.
//!
//! Distributes a payment's available cash across a customer's open invoices,
//! oldest first (`order_date`, then order id).

use chrono::NaiveDate;
use polyroll_shared::types::{Amount, OrderId};
use serde::{Deserialize, Serialize};

/// A billable order that may absorb cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInvoice {
    /// Order id, the tie-breaker.
    pub order_id: OrderId,
    /// Order date, the primary sort key.
    pub order_date: NaiveDate,
    /// Outstanding balance across all payments.
    pub outstanding: Amount,
    /// Cash this payment already applies to the order.
    pub existing_on_payment: Amount,
}

/// One allocation the planner wants written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FifoStep {
    /// Target order.
    pub order_id: OrderId,
    /// Cash added by this pass.
    pub increment: Amount,
    /// New value of the (payment, order) row: existing plus increment.
    pub new_amount: Amount,
}

/// Plans a FIFO pass over `invoices` with `available` cash.
///
/// Invoices without a positive outstanding are skipped; the pass stops when
/// the cash runs out. Leftover cash stays unapplied.
#[must_use]
pub fn plan_fifo(available: Amount, invoices: &[OpenInvoice]) -> Vec<FifoStep> {
    let mut ordered: Vec<&OpenInvoice> = invoices.iter().collect();
    ordered.sort_by_key(|inv| (inv.order_date, inv.order_id));

    let mut remaining = available;
    let mut steps = Vec::new();
    for invoice in ordered {
        if remaining <= 0 {
            break;
        }
        if invoice.outstanding <= 0 {
            continue;
        }
        let increment = remaining.min(invoice.outstanding);
        steps.push(FifoStep {
            order_id: invoice.order_id,
            increment,
            new_amount: invoice.existing_on_payment + increment,
        });
        remaining -= increment;
    }

    tracing::debug!(
        available,
        allocated = available.max(0) - remaining.max(0),
        steps = steps.len(),
        "planned FIFO allocation"
    );
    steps
}
