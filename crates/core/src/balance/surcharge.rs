//! Negative-material surcharge.
//!
//! A configurable business rule: when a customer has consumed more material
//! than they supplied, the shortfall can be billed per kg.

use polyroll_shared::config::ShortfallSettings;
use polyroll_shared::types::{Amount, to_currency_int};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Surcharge rule in effect for one customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurchargePolicy {
    /// Whether the surcharge applies.
    pub enabled: bool,
    /// Charge per kg of shortfall.
    pub rate_per_kg: Decimal,
}

impl SurchargePolicy {
    /// Customer overrides win over the global settings.
    #[must_use]
    pub fn resolve(
        settings: &ShortfallSettings,
        customer_enabled: Option<bool>,
        customer_rate_per_kg: Option<Decimal>,
    ) -> Self {
        Self {
            enabled: customer_enabled.unwrap_or(settings.enabled),
            rate_per_kg: customer_rate_per_kg.unwrap_or(settings.default_rate_per_kg),
        }
    }

    /// `round(shortfall_kg × rate)` for a negative balance, zero otherwise.
    #[must_use]
    pub fn charge(&self, material_balance_kg: Decimal) -> Amount {
        if !self.enabled || self.rate_per_kg <= Decimal::ZERO || material_balance_kg >= Decimal::ZERO {
            return 0;
        }
        to_currency_int(-material_balance_kg * self.rate_per_kg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(true, dec!(40), dec!(-12.5), 500)]
    #[case(true, dec!(40), dec!(-0.0125), 1)]
    #[case(true, dec!(40), dec!(0), 0)]
    #[case(true, dec!(40), dec!(10), 0)]
    #[case(false, dec!(40), dec!(-12.5), 0)]
    #[case(true, dec!(0), dec!(-12.5), 0)]
    fn test_charge(
        #[case] enabled: bool,
        #[case] rate_per_kg: Decimal,
        #[case] balance: Decimal,
        #[case] expected: Amount,
    ) {
        let policy = SurchargePolicy { enabled, rate_per_kg };
        assert_eq!(policy.charge(balance), expected);
    }

    #[test]
    fn test_customer_override_wins() {
        let settings = ShortfallSettings {
            enabled: true,
            default_rate_per_kg: dec!(30),
            label: "Shortfall".into(),
        };
        let global = SurchargePolicy::resolve(&settings, None, None);
        assert!(global.enabled);
        assert_eq!(global.rate_per_kg, dec!(30));

        let opted_out = SurchargePolicy::resolve(&settings, Some(false), Some(dec!(55)));
        assert!(!opted_out.enabled);
        assert_eq!(opted_out.rate_per_kg, dec!(55));
    }
}
