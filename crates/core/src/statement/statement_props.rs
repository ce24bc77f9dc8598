//! Property-based tests for period statements.
//!
//! - Closing balance equals the pending balance at the period end
//! - Opening balance equals the pending balance the day before the start
//! - Consecutive periods chain: one period's closing is the next one's opening

use chrono::{Duration, NaiveDate};
use polyroll_shared::types::{CustomerId, LedgerEntryId, OrderId, PaymentId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::period::PeriodStatement;
use crate::balance::{AdjustmentLine, BilledOrder, CustomerAccount, PaymentLine, SurchargePolicy};
use crate::material::{EntryType, MaterialLedgerEntry, Party};
use crate::orders::OrderStatus;
use crate::receivables::PaymentMethod;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn status() -> impl Strategy<Value = OrderStatus> {
    prop::sample::select(OrderStatus::ALL.to_vec())
}

fn account_strategy() -> impl Strategy<Value = CustomerAccount> {
    (
        -5_000i64..5_000,
        prop::collection::vec((0i64..120, status(), 0i64..20_000), 0..10),
        prop::collection::vec((0i64..120, 0i64..10_000), 0..10),
        prop::collection::vec((0i64..120, -100i64..100), 0..5),
        prop::collection::vec((0i64..120, -50_000i64..50_000), 0..10),
        any::<bool>(),
        0i64..50,
    )
        .prop_map(|(carry, orders, payments, adjustments, moves, enabled, rate)| {
            let customer_id = CustomerId::new();
            let day = |offset: i64| base() + Duration::days(offset);
            CustomerAccount {
                customer_id,
                carry_forward: carry,
                orders: orders
                    .into_iter()
                    .map(|(offset, status, grand_total)| BilledOrder {
                        order_id: OrderId::new(),
                        invoice_number: String::new(),
                        order_date: day(offset),
                        status,
                        billable_kg: Decimal::ZERO,
                        grand_total,
                        settled: 0,
                    })
                    .collect(),
                payments: payments
                    .into_iter()
                    .map(|(offset, amount)| PaymentLine {
                        payment_id: PaymentId::new(),
                        received_on: day(offset),
                        amount,
                        method: PaymentMethod::Cash,
                        reference: String::new(),
                    })
                    .collect(),
                adjustments: adjustments
                    .into_iter()
                    .map(|(offset, amount)| AdjustmentLine {
                        order_id: OrderId::new(),
                        applied_on: day(offset),
                        amount,
                    })
                    .filter(|a| a.amount != 0)
                    .collect(),
                material_entries: moves
                    .into_iter()
                    .filter(|(_, grams)| *grams != 0)
                    .map(|(offset, grams)| {
                        let delta_kg = Decimal::new(grams, 3);
                        MaterialLedgerEntry {
                            id: LedgerEntryId::new(),
                            party: Party::Customer(customer_id),
                            entry_type: EntryType::for_delta(delta_kg),
                            delta_kg,
                            date: day(offset),
                            material_type: None,
                            memo: String::new(),
                            order_id: None,
                            receipt_id: None,
                            raw_txn_id: None,
                        }
                    })
                    .collect(),
                surcharge: SurchargePolicy {
                    enabled,
                    rate_per_kg: Decimal::from(rate),
                },
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_statement_reconciles(
        account in account_strategy(),
        start in 0i64..120,
        len in 0i64..60,
    ) {
        let start = base() + Duration::days(start);
        let end = start + Duration::days(len);
        let stmt = PeriodStatement::build(&account, start, end, "Shortfall").unwrap();

        prop_assert_eq!(stmt.closing_balance, account.pending_balance_as_of(end));
        prop_assert_eq!(stmt.opening_balance, account.pending_balance_as_of(start - Duration::days(1)));
        prop_assert_eq!(
            stmt.material.closing_kg,
            stmt.material.opening_kg + stmt.material.in_kg - stmt.material.out_kg
        );
    }

    #[test]
    fn prop_consecutive_periods_chain(
        account in account_strategy(),
        start in 0i64..60,
        first_len in 0i64..30,
        second_len in 0i64..30,
    ) {
        let start = base() + Duration::days(start);
        let mid = start + Duration::days(first_len);
        let end = mid + Duration::days(1 + second_len);

        let first = PeriodStatement::build(&account, start, mid, "Shortfall").unwrap();
        let second = PeriodStatement::build(&account, mid + Duration::days(1), end, "Shortfall").unwrap();

        prop_assert_eq!(first.closing_balance, second.opening_balance);
        prop_assert_eq!(first.material.closing_kg, second.material.opening_kg);
    }
}
