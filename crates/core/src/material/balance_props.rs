//! Property-based tests for material balances.
//!
//! - Closing balance equals opening balance plus period movement
//! - Balance as of a date is the sum of all deltas up to that date

use chrono::{Duration, NaiveDate};
use polyroll_shared::types::LedgerEntryId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{MaterialSummary, balance_as_of, period_movement};
use super::entry::{EntryType, MaterialLedgerEntry, Party};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

/// Strategy for a signed delta (-500.000 to 500.000 kg, never zero).
fn delta_kg() -> impl Strategy<Value = Decimal> {
    (-500_000i64..500_000i64)
        .prop_filter("non-zero", |g| *g != 0)
        .prop_map(|grams| Decimal::new(grams, 3))
}

fn entries_strategy(party: Party) -> impl Strategy<Value = Vec<MaterialLedgerEntry>> {
    prop::collection::vec((delta_kg(), 0i64..120), 0..40).prop_map(move |rows| {
        rows.into_iter()
            .map(|(delta_kg, offset)| MaterialLedgerEntry {
                id: LedgerEntryId::new(),
                party,
                entry_type: EntryType::for_delta(delta_kg),
                delta_kg,
                date: base_date() + Duration::days(offset),
                material_type: None,
                memo: String::new(),
                order_id: None,
                receipt_id: None,
                raw_txn_id: None,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_summary_reconciles(
        entries in entries_strategy(Party::CompanyStock),
        start_offset in 1i64..60,
        length in 0i64..60,
    ) {
        let start = base_date() + Duration::days(start_offset);
        let end = start + Duration::days(length);
        let summary = MaterialSummary::for_period(&entries, Party::CompanyStock, start, end).unwrap();

        prop_assert_eq!(summary.closing_kg, balance_as_of(&entries, Party::CompanyStock, end));
        prop_assert_eq!(
            summary.opening_kg + summary.in_kg - summary.out_kg,
            summary.closing_kg
        );
    }

    #[test]
    fn prop_full_range_movement_equals_balance(entries in entries_strategy(Party::CompanyStock)) {
        let end = base_date() + Duration::days(200);
        let movement = period_movement(&entries, Party::CompanyStock, base_date(), end).unwrap();
        prop_assert_eq!(movement.net(), balance_as_of(&entries, Party::CompanyStock, end));
        prop_assert!(!movement.in_kg.is_sign_negative());
        prop_assert!(!movement.out_kg.is_sign_negative());
    }
}
