//! Period statement arithmetic.

use chrono::NaiveDate;
use polyroll_shared::types::{Amount, OrderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::StatementError;
use crate::balance::{CustomerAccount, PaymentLine};
use crate::material::{EntryType, MaterialKind, MaterialSummary};

/// A billed order inside the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementOrderLine {
    /// Order id.
    pub order_id: OrderId,
    /// Invoice number.
    pub invoice_number: String,
    /// Order date.
    pub order_date: NaiveDate,
    /// Billed weight.
    pub billable_kg: Decimal,
    /// Grand total.
    pub grand_total: Amount,
}

/// A material movement not caused by an order (receipts, sales, transfers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementMaterialLine {
    /// Business date.
    pub date: NaiveDate,
    /// Direction.
    pub entry_type: EntryType,
    /// Signed kg.
    pub delta_kg: Decimal,
    /// Material type, if recorded.
    pub material_type: Option<MaterialKind>,
    /// Ledger memo.
    pub memo: String,
}

/// Surcharge movement over the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeLine {
    /// Display label.
    pub label: String,
    /// `surcharge(end) − surcharge(start − 1)`; may be negative.
    pub amount: Amount,
}

/// Cash and material picture of one customer over `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStatement {
    /// First day of the period.
    pub start: NaiveDate,
    /// Last day of the period.
    pub end: NaiveDate,
    /// Pending balance at the end of the day before `start`.
    pub opening_balance: Amount,
    /// Σ grand total of final orders dated in the period.
    pub period_charges: Amount,
    /// Surcharge movement, omitted when zero.
    pub surcharge: Option<SurchargeLine>,
    /// Σ payments received in the period.
    pub period_payments: Amount,
    /// Σ rounding write-offs applied in the period.
    pub period_adjustments: Amount,
    /// `opening + charges + surcharge − payments − adjustments`
    pub closing_balance: Amount,
    /// Material section.
    pub material: MaterialSummary,
    /// Billed orders.
    pub orders: Vec<StatementOrderLine>,
    /// Payments received.
    pub payments: Vec<PaymentLine>,
    /// Non-order material movements.
    pub material_lines: Vec<StatementMaterialLine>,
}

impl PeriodStatement {
    /// Builds the statement for `[start, end]`.
    ///
    /// The closing balance equals `account.pending_balance_as_of(end)`.
    ///
    /// # Errors
    ///
    /// Returns `StatementError::InvalidPeriod` if `start > end`, or
    /// `StatementError::DateOutOfRange` if `start` has no preceding day.
    pub fn build(
        account: &CustomerAccount,
        start: NaiveDate,
        end: NaiveDate,
        surcharge_label: &str,
    ) -> Result<Self, StatementError> {
        if start > end {
            return Err(StatementError::InvalidPeriod { start, end });
        }
        let day_before = start.pred_opt().ok_or(StatementError::DateOutOfRange(start))?;

        let opening_balance = account.pending_balance_as_of(day_before);
        let period_charges = account.billed_between(Some(start), end);
        let surcharge_delta = account.surcharge_as_of(end) - account.surcharge_as_of(day_before);
        let period_payments = account.paid_between(Some(start), end);
        let period_adjustments = account.adjusted_between(Some(start), end);
        let closing_balance =
            opening_balance + period_charges + surcharge_delta - period_payments - period_adjustments;

        let material =
            MaterialSummary::for_period(&account.material_entries, account.party(), start, end)?;

        let mut orders: Vec<StatementOrderLine> = account
            .orders
            .iter()
            .filter(|o| o.status.is_final() && o.order_date >= start && o.order_date <= end)
            .map(|o| StatementOrderLine {
                order_id: o.order_id,
                invoice_number: o.invoice_number.clone(),
                order_date: o.order_date,
                billable_kg: o.billable_kg,
                grand_total: o.grand_total,
            })
            .collect();
        orders.sort_by(|a, b| (a.order_date, &a.invoice_number).cmp(&(b.order_date, &b.invoice_number)));

        let mut payments: Vec<PaymentLine> = account
            .payments
            .iter()
            .filter(|p| p.received_on >= start && p.received_on <= end)
            .cloned()
            .collect();
        payments.sort_by_key(|p| (p.received_on, p.payment_id.into_inner()));

        let party = account.party();
        let mut material_lines: Vec<StatementMaterialLine> = account
            .material_entries
            .iter()
            .filter(|e| e.is_owned_by(party) && e.order_id.is_none() && e.date >= start && e.date <= end)
            .map(|e| StatementMaterialLine {
                date: e.date,
                entry_type: e.entry_type,
                delta_kg: e.delta_kg,
                material_type: e.material_type,
                memo: e.memo.clone(),
            })
            .collect();
        material_lines.sort_by_key(|l| l.date);

        Ok(Self {
            start,
            end,
            opening_balance,
            period_charges,
            surcharge: (surcharge_delta != 0).then(|| SurchargeLine {
                label: surcharge_label.to_string(),
                amount: surcharge_delta,
            }),
            period_payments,
            period_adjustments,
            closing_balance,
            material,
            orders,
            payments,
            material_lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyroll_shared::types::{CustomerId, LedgerEntryId, PaymentId, ReceiptId};
    use rust_decimal_macros::dec;

    use crate::balance::{AdjustmentLine, BilledOrder, SurchargePolicy};
    use crate::material::{MaterialLedgerEntry, Party};
    use crate::orders::OrderStatus;
    use crate::receivables::PaymentMethod;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    fn account(surcharge_enabled: bool) -> CustomerAccount {
        let customer_id = CustomerId::new();
        let party = Party::Customer(customer_id);
        let order_id = OrderId::new();
        CustomerAccount {
            customer_id,
            carry_forward: 2_500,
            orders: vec![
                BilledOrder {
                    order_id,
                    invoice_number: "SSP-00001".into(),
                    order_date: d(3, 5),
                    status: OrderStatus::Delivered,
                    billable_kg: dec!(120),
                    grand_total: 14_160,
                    settled: 10_000,
                },
                BilledOrder {
                    order_id: OrderId::new(),
                    invoice_number: "SSP-00002".into(),
                    order_date: d(3, 20),
                    status: OrderStatus::InProduction,
                    billable_kg: dec!(50),
                    grand_total: 5_900,
                    settled: 0,
                },
            ],
            payments: vec![
                PaymentLine {
                    payment_id: PaymentId::new(),
                    received_on: d(2, 27),
                    amount: 500,
                    method: PaymentMethod::Cash,
                    reference: String::new(),
                },
                PaymentLine {
                    payment_id: PaymentId::new(),
                    received_on: d(3, 12),
                    amount: 10_000,
                    method: PaymentMethod::Transfer,
                    reference: "UTR-1".into(),
                },
            ],
            adjustments: vec![AdjustmentLine {
                order_id,
                applied_on: d(3, 12),
                amount: -40,
            }],
            material_entries: vec![
                MaterialLedgerEntry {
                    id: LedgerEntryId::new(),
                    party,
                    entry_type: EntryType::In,
                    delta_kg: dec!(100),
                    date: d(3, 1),
                    material_type: Some(MaterialKind::Film),
                    memo: "12 bags".into(),
                    order_id: None,
                    receipt_id: Some(ReceiptId::new()),
                    raw_txn_id: None,
                },
                MaterialLedgerEntry {
                    id: LedgerEntryId::new(),
                    party,
                    entry_type: EntryType::Out,
                    delta_kg: dec!(-120),
                    date: d(3, 5),
                    material_type: None,
                    memo: "Consumption for Order SSP-00001".into(),
                    order_id: Some(order_id),
                    receipt_id: None,
                    raw_txn_id: None,
                },
            ],
            surcharge: SurchargePolicy {
                enabled: surcharge_enabled,
                rate_per_kg: dec!(10),
            },
        }
    }

    #[test]
    fn test_statement_reconciles_with_pending_balance() {
        for enabled in [false, true] {
            let acct = account(enabled);
            let stmt = PeriodStatement::build(&acct, d(3, 1), d(3, 31), "Shortfall").unwrap();
            assert_eq!(stmt.opening_balance, acct.pending_balance_as_of(d(2, 28)));
            assert_eq!(stmt.closing_balance, acct.pending_balance_as_of(d(3, 31)));
        }
    }

    #[test]
    fn test_statement_figures() {
        let acct = account(true);
        let stmt = PeriodStatement::build(&acct, d(3, 1), d(3, 31), "Shortfall").unwrap();

        assert_eq!(stmt.opening_balance, 2_000);
        assert_eq!(stmt.period_charges, 14_160);
        assert_eq!(stmt.period_payments, 10_000);
        assert_eq!(stmt.period_adjustments, -40);
        // 20 kg short at 10 per kg
        assert_eq!(
            stmt.surcharge,
            Some(SurchargeLine {
                label: "Shortfall".into(),
                amount: 200
            })
        );
        assert_eq!(stmt.closing_balance, 2_000 + 14_160 + 200 - 10_000 + 40);

        assert_eq!(stmt.material.opening_kg, dec!(0));
        assert_eq!(stmt.material.in_kg, dec!(100));
        assert_eq!(stmt.material.out_kg, dec!(120));
        assert_eq!(stmt.material.closing_kg, dec!(-20));

        assert_eq!(stmt.orders.len(), 1);
        assert_eq!(stmt.orders[0].invoice_number, "SSP-00001");
        assert_eq!(stmt.payments.len(), 1);
        assert_eq!(stmt.material_lines.len(), 1);
        assert_eq!(stmt.material_lines[0].memo, "12 bags");
    }

    #[test]
    fn test_surcharge_line_omitted_when_disabled() {
        let stmt = PeriodStatement::build(&account(false), d(3, 1), d(3, 31), "Shortfall").unwrap();
        assert!(stmt.surcharge.is_none());
    }

    #[test]
    fn test_reversed_period_rejected() {
        let err = PeriodStatement::build(&account(false), d(3, 31), d(3, 1), "Shortfall").unwrap_err();
        assert!(matches!(err, StatementError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_single_day_period() {
        let acct = account(false);
        let stmt = PeriodStatement::build(&acct, d(3, 5), d(3, 5), "Shortfall").unwrap();
        assert_eq!(stmt.period_charges, 14_160);
        assert_eq!(stmt.closing_balance, acct.pending_balance_as_of(d(3, 5)));
    }

    #[test]
    fn test_first_representable_date_rejected() {
        let err = PeriodStatement::build(&account(false), NaiveDate::MIN, d(3, 1), "Shortfall").unwrap_err();
        assert!(matches!(err, StatementError::DateOutOfRange(_)));
    }
}
