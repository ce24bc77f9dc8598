//! Currency normalization.
//!
//! CRITICAL: Never use floating-point for money calculations.
//!
//! Ledger-level money (payments, allocations, order totals) is stored and
//! compared as whole currency units in an `i64`; there is no sub-unit currency
//! in this domain. Unit prices and rates keep two fractional digits and are
//! persisted as hundredths. Every conversion from a higher-precision `Decimal`
//! rounds half-up (away from zero on the midpoint).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// A ledger-level money amount in whole currency units.
pub type Amount = i64;

/// Converts a decimal money value into whole currency units, rounding half-up.
///
/// Values outside the `i64` range saturate.
#[must_use]
pub fn to_currency_int(value: Decimal) -> Amount {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        Amount::MIN
    } else {
        Amount::MAX
    })
}

/// Lifts a whole-unit amount into a `Decimal` for rate arithmetic.
#[must_use]
pub fn amount_to_decimal(amount: Amount) -> Decimal {
    Decimal::from(amount)
}

/// Quantizes a unit price or rate to two fractional digits, rounding half-up.
#[must_use]
pub fn normalize_rate(rate: Decimal) -> Decimal {
    let mut rounded = rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Converts a rate into its persisted form (hundredths of a currency unit).
#[must_use]
pub fn rate_to_hundredths(rate: Decimal) -> i64 {
    let scaled = normalize_rate(rate) * Decimal::ONE_HUNDRED;
    scaled.to_i64().unwrap_or(if scaled.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Restores a persisted rate from hundredths.
#[must_use]
pub fn rate_from_hundredths(hundredths: i64) -> Decimal {
    Decimal::new(hundredths, 2)
}

/// Formats a whole-unit amount with two decimals.
///
/// Legacy display convention for exports only; storage stays integral.
#[must_use]
pub fn format_amount_2dp(amount: Amount) -> String {
    let mut value = amount_to_decimal(amount);
    value.rescale(2);
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(99.50), 100)]
    #[case(dec!(99.49), 99)]
    #[case(dec!(0.5), 1)]
    #[case(dec!(2.4999), 2)]
    #[case(dec!(-99.5), -100)]
    #[case(dec!(-0.4), 0)]
    #[case(dec!(1250), 1250)]
    fn test_to_currency_int_rounds_half_up(#[case] input: Decimal, #[case] expected: Amount) {
        assert_eq!(to_currency_int(input), expected);
    }

    #[test]
    fn test_to_currency_int_is_deterministic() {
        let input = dec!(99.50);
        let first = to_currency_int(input);
        for _ in 0..100 {
            assert_eq!(to_currency_int(input), first);
        }
        assert_eq!(to_currency_int(amount_to_decimal(first)), first);
    }

    #[test]
    fn test_to_currency_int_saturates() {
        assert_eq!(to_currency_int(Decimal::MAX), Amount::MAX);
        assert_eq!(to_currency_int(Decimal::MIN), Amount::MIN);
    }

    #[test]
    fn test_rate_hundredths_round_trip() {
        assert_eq!(rate_to_hundredths(dec!(52.75)), 5275);
        assert_eq!(rate_to_hundredths(dec!(52.755)), 5276);
        assert_eq!(rate_from_hundredths(5275), dec!(52.75));
        assert_eq!(normalize_rate(dec!(3)).to_string(), "3.00");
    }

    #[rstest]
    #[case(0, "0.00")]
    #[case(1234, "1234.00")]
    #[case(-75, "-75.00")]
    fn test_format_amount_2dp(#[case] amount: Amount, #[case] expected: &str) {
        assert_eq!(format_amount_2dp(amount), expected);
    }
}
