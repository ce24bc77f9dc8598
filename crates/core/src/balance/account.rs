//! Customer balance aggregation.
//!
//! A [`CustomerAccount`] is a read-only snapshot of everything that moves a
//! customer's cash and material balances. All figures are derived by summing
//! source facts up to a date; nothing here is cached.

use chrono::NaiveDate;
use polyroll_shared::types::{Amount, CustomerId, OrderId, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::surcharge::SurchargePolicy;
use crate::material::{MaterialLedgerEntry, Party, balance_as_of};
use crate::orders::{Order, OrderStatus, OrderTotals};
use crate::receivables::PaymentMethod;

/// Customer fields the ledger math touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer id.
    pub id: CustomerId,
    /// Company name.
    pub company_name: String,
    /// Contact person.
    pub contact_name: String,
    /// Phone number.
    pub phone: String,
    /// Carry-forward imported from before the ledger began.
    pub previous_pending_balance: Amount,
    /// Cached pending balance for list views.
    pub pending_balance: Amount,
    /// Surcharge toggle override.
    pub shortfall_enabled: Option<bool>,
    /// Surcharge rate override.
    pub shortfall_rate_per_kg: Option<Decimal>,
}

/// An order as seen by the balance: its status, date and money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilledOrder {
    /// Order id.
    pub order_id: OrderId,
    /// Invoice number.
    pub invoice_number: String,
    /// Order date.
    pub order_date: NaiveDate,
    /// Status.
    pub status: OrderStatus,
    /// Billed weight.
    pub billable_kg: Decimal,
    /// Grand total.
    pub grand_total: Amount,
    /// Σ (amount + rounding) of allocations to the order.
    pub settled: Amount,
}

impl BilledOrder {
    /// Builds the view of an order from its totals and settled amount.
    #[must_use]
    pub fn from_order(order: &Order, tax_ratio: Decimal, settled: Amount) -> Self {
        let totals = OrderTotals::compute(order, tax_ratio);
        Self {
            order_id: order.id,
            invoice_number: order.invoice_number.clone(),
            order_date: order.order_date,
            status: order.status,
            billable_kg: totals.billable_kg,
            grand_total: totals.grand_total,
            settled,
        }
    }

    /// `grand_total − settled`
    #[must_use]
    pub const fn outstanding(&self) -> Amount {
        self.grand_total - self.settled
    }
}

/// A payment as seen by the balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLine {
    /// Payment id.
    pub payment_id: PaymentId,
    /// Date received.
    pub received_on: NaiveDate,
    /// Amount.
    pub amount: Amount,
    /// Method.
    pub method: PaymentMethod,
    /// Reference.
    pub reference: String,
}

/// A rounding write-off on an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLine {
    /// Order written off against.
    pub order_id: OrderId,
    /// Date applied.
    pub applied_on: NaiveDate,
    /// Signed write-off.
    pub amount: Amount,
}

/// Snapshot of a customer's ledgers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAccount {
    /// Customer id.
    pub customer_id: CustomerId,
    /// Carry-forward.
    pub carry_forward: Amount,
    /// All orders of the customer.
    pub orders: Vec<BilledOrder>,
    /// All payments of the customer.
    pub payments: Vec<PaymentLine>,
    /// All rounding write-offs on the customer's orders.
    pub adjustments: Vec<AdjustmentLine>,
    /// Material ledger rows of the customer.
    pub material_entries: Vec<MaterialLedgerEntry>,
    /// Surcharge rule in effect.
    pub surcharge: SurchargePolicy,
}

impl CustomerAccount {
    /// Material ledger party of the customer.
    #[must_use]
    pub const fn party(&self) -> Party {
        Party::Customer(self.customer_id)
    }

    /// Σ grand total of final orders dated in `[from, to]` (open start when `from` is None).
    #[must_use]
    pub fn billed_between(&self, from: Option<NaiveDate>, to: NaiveDate) -> Amount {
        self.orders
            .iter()
            .filter(|o| o.status.is_final() && in_range(o.order_date, from, to))
            .map(|o| o.grand_total)
            .sum()
    }

    /// Σ payments received in `[from, to]`.
    #[must_use]
    pub fn paid_between(&self, from: Option<NaiveDate>, to: NaiveDate) -> Amount {
        self.payments
            .iter()
            .filter(|p| in_range(p.received_on, from, to))
            .map(|p| p.amount)
            .sum()
    }

    /// Σ rounding write-offs applied in `[from, to]`.
    #[must_use]
    pub fn adjusted_between(&self, from: Option<NaiveDate>, to: NaiveDate) -> Amount {
        self.adjustments
            .iter()
            .filter(|a| in_range(a.applied_on, from, to))
            .map(|a| a.amount)
            .sum()
    }

    /// Material balance at the end of `as_of`.
    #[must_use]
    pub fn material_balance_as_of(&self, as_of: NaiveDate) -> Decimal {
        balance_as_of(&self.material_entries, self.party(), as_of)
    }

    /// Surcharge owed for the material balance at the end of `as_of`.
    #[must_use]
    pub fn surcharge_as_of(&self, as_of: NaiveDate) -> Amount {
        self.surcharge.charge(self.material_balance_as_of(as_of))
    }

    /// Pending balance at the end of `as_of`:
    /// `carry + billed − paid − write-offs + surcharge`.
    #[must_use]
    pub fn pending_balance_as_of(&self, as_of: NaiveDate) -> Amount {
        self.carry_forward + self.billed_between(None, as_of)
            - self.paid_between(None, as_of)
            - self.adjusted_between(None, as_of)
            + self.surcharge_as_of(as_of)
    }

    /// Σ outstanding of final orders, regardless of date.
    #[must_use]
    pub fn outstanding_total(&self) -> Amount {
        self.orders
            .iter()
            .filter(|o| o.status.is_final())
            .map(BilledOrder::outstanding)
            .sum()
    }
}

fn in_range(date: NaiveDate, from: Option<NaiveDate>, to: NaiveDate) -> bool {
    date <= to && from.is_none_or(|from| date >= from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyroll_shared::types::LedgerEntryId;
    use rust_decimal_macros::dec;

    use crate::material::EntryType;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    fn billed(date: NaiveDate, status: OrderStatus, grand_total: Amount, settled: Amount) -> BilledOrder {
        BilledOrder {
            order_id: OrderId::new(),
            invoice_number: String::new(),
            order_date: date,
            status,
            billable_kg: dec!(10),
            grand_total,
            settled,
        }
    }

    fn account() -> CustomerAccount {
        let customer_id = CustomerId::new();
        CustomerAccount {
            customer_id,
            carry_forward: 1_000,
            orders: vec![
                billed(d(1, 10), OrderStatus::Ready, 5_000, 4_000),
                billed(d(2, 5), OrderStatus::Delivered, 3_000, 0),
                billed(d(2, 6), OrderStatus::Confirmed, 9_999, 0),
            ],
            payments: vec![PaymentLine {
                payment_id: PaymentId::new(),
                received_on: d(1, 20),
                amount: 3_950,
                method: PaymentMethod::Cash,
                reference: String::new(),
            }],
            adjustments: vec![AdjustmentLine {
                order_id: OrderId::new(),
                applied_on: d(1, 20),
                amount: 50,
            }],
            material_entries: vec![MaterialLedgerEntry {
                id: LedgerEntryId::new(),
                party: Party::Customer(customer_id),
                entry_type: EntryType::Out,
                delta_kg: dec!(-10),
                date: d(2, 1),
                material_type: None,
                memo: String::new(),
                order_id: None,
                receipt_id: None,
                raw_txn_id: None,
            }],
            surcharge: SurchargePolicy {
                enabled: true,
                rate_per_kg: dec!(25),
            },
        }
    }

    #[test]
    fn test_pending_balance_as_of() {
        let acct = account();
        assert_eq!(acct.pending_balance_as_of(d(1, 9)), 1_000);
        assert_eq!(acct.pending_balance_as_of(d(1, 10)), 6_000);
        // 1000 + 5000 - 3950 - 50
        assert_eq!(acct.pending_balance_as_of(d(1, 31)), 2_000);
        // + 3000 billed + 250 surcharge (10 kg short × 25); the CONFIRMED order is not billed
        assert_eq!(acct.pending_balance_as_of(d(2, 28)), 5_250);
    }

    #[test]
    fn test_outstanding_total_counts_final_orders_only() {
        assert_eq!(account().outstanding_total(), 4_000);
    }

    #[test]
    fn test_ranges_are_inclusive() {
        let acct = account();
        assert_eq!(acct.billed_between(Some(d(1, 10)), d(2, 5)), 8_000);
        assert_eq!(acct.paid_between(Some(d(1, 21)), d(2, 28)), 0);
    }
}
