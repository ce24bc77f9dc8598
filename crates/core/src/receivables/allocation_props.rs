//! Property-based tests for allocation validation and FIFO planning.
//!
//! - An allocation is accepted iff both the payment and the order bounds hold
//! - An accepted allocation never leaves negative unapplied cash or an
//!   over-credited order beyond tolerance
//! - FIFO allocates min(available, Σ outstanding), filling older invoices first

use chrono::{Duration, NaiveDate};
use polyroll_shared::types::{Amount, OrderId};
use proptest::prelude::*;

use super::allocation::{AllocationBounds, AllocationRequest, validate_allocation};
use super::fifo::{OpenInvoice, plan_fifo};
use crate::orders::OrderStatus;

fn final_status() -> impl Strategy<Value = OrderStatus> {
    prop_oneof![
        Just(OrderStatus::Ready),
        Just(OrderStatus::Delivered),
        Just(OrderStatus::Closed),
    ]
}

fn bounds_strategy() -> impl Strategy<Value = AllocationBounds> {
    (
        final_status(),
        0i64..5_000,
        0i64..5_000,
        0i64..5_000,
        0i64..5_000,
        0i64..200,
    )
        .prop_map(
            |(order_status, grand, payment, other_cash, other_effective, tolerance)| AllocationBounds {
                order_status,
                order_grand_total: grand,
                payment_amount: payment,
                other_cash_on_payment: other_cash.min(payment),
                other_effective_on_order: other_effective,
                tolerance,
            },
        )
}

fn invoices_strategy() -> impl Strategy<Value = Vec<OpenInvoice>> {
    prop::collection::vec((0i64..60, -50i64..500), 0..12).prop_map(|rows| {
        let base = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        rows.into_iter()
            .map(|(offset, outstanding)| OpenInvoice {
                order_id: OrderId::new(),
                order_date: base + Duration::days(offset),
                outstanding,
                existing_on_payment: 0,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_allocation_accepted_iff_bounds_hold(
        bounds in bounds_strategy(),
        amount in -100i64..6_000,
        rounding in -250i64..250,
    ) {
        let request = AllocationRequest { amount, rounding_adjustment: rounding };
        let effective = amount + rounding;
        let expected = amount >= 0
            && rounding.abs() <= bounds.tolerance
            && !(amount == 0 && rounding == 0)
            && effective >= 0
            && amount <= bounds.payment_room()
            && effective <= bounds.order_outstanding() + bounds.tolerance;

        let result = validate_allocation(&bounds, request);
        prop_assert_eq!(result.is_ok(), expected);

        if result.is_ok() {
            let unapplied_after = bounds.payment_amount - bounds.other_cash_on_payment - amount;
            prop_assert!(unapplied_after >= 0);
            let overpay = bounds.other_effective_on_order + effective - bounds.order_grand_total;
            prop_assert!(overpay <= bounds.tolerance);
        }
    }

    #[test]
    fn prop_fifo_fills_oldest_first(available in 0i64..3_000, invoices in invoices_strategy()) {
        let steps = plan_fifo(available, &invoices);

        let open_total: Amount = invoices.iter().map(|i| i.outstanding.max(0)).sum();
        let allocated: Amount = steps.iter().map(|s| s.increment).sum();
        prop_assert_eq!(allocated, available.min(open_total));

        let mut ordered: Vec<&OpenInvoice> = invoices.iter().filter(|i| i.outstanding > 0).collect();
        ordered.sort_by_key(|i| (i.order_date, i.order_id));

        // Every step but the last fully settles its invoice, in FIFO order.
        for (step, invoice) in steps.iter().zip(ordered.iter()) {
            prop_assert_eq!(step.order_id, invoice.order_id);
            prop_assert!(step.increment > 0 && step.increment <= invoice.outstanding);
        }
        if steps.len() > 1 {
            for (step, invoice) in steps[..steps.len() - 1].iter().zip(ordered.iter()) {
                prop_assert_eq!(step.increment, invoice.outstanding);
            }
        }
    }
}
