//! Order domain types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use polyroll_shared::types::{CustomerId, OrderId, OrderRollId, to_weight_kg};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::OrderError;
use crate::material::MaterialKind;

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Booked, not yet committed.
    Draft,
    /// Material reserved.
    Confirmed,
    /// Rolls being produced.
    InProduction,
    /// Produced and ready for shipping.
    Ready,
    /// Shipped to the customer.
    Delivered,
    /// Settled and archived.
    Closed,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Draft,
        Self::Confirmed,
        Self::InProduction,
        Self::Ready,
        Self::Delivered,
        Self::Closed,
    ];

    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Confirmed => "CONFIRMED",
            Self::InProduction => "IN_PRODUCTION",
            Self::Ready => "READY",
            Self::Delivered => "DELIVERED",
            Self::Closed => "CLOSED",
        }
    }

    /// Billable and collectable statuses.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Ready | Self::Delivered | Self::Closed)
    }

    /// Statuses whose target weight is drawn from the customer's material.
    #[must_use]
    pub const fn consumes_material(self) -> bool {
        !matches!(self, Self::Draft)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "CONFIRMED" => Ok(Self::Confirmed),
            "IN_PRODUCTION" | "INPROD" => Ok(Self::InProduction),
            "READY" => Ok(Self::Ready),
            "DELIVERED" => Ok(Self::Delivered),
            "CLOSED" => Ok(Self::Closed),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

/// A customer order (invoice), with the fields the ledger math touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order id.
    pub id: OrderId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Invoice number, e.g. `SSP-00042`.
    pub invoice_number: String,
    /// Business date used for billing and consumption.
    pub order_date: NaiveDate,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Weight the customer booked.
    pub target_total_kg: Decimal,
    /// Sum of produced roll weights.
    pub produced_kg: Decimal,
    /// Unit price, two decimals.
    pub price_per_kg: Decimal,
    /// Whether tax is charged.
    pub include_tax: bool,
    /// Allowed produced/target deviation when finalizing.
    pub tolerance_kg: Decimal,
    /// Optional material category.
    pub material_type: Option<MaterialKind>,
}

impl Order {
    /// Weight that is billed: produced once final, target before.
    #[must_use]
    pub fn billable_kg(&self) -> Decimal {
        if self.status.is_final() {
            to_weight_kg(self.produced_kg)
        } else {
            to_weight_kg(self.target_total_kg)
        }
    }

    /// Target minus produced.
    #[must_use]
    pub fn remaining_kg(&self) -> Decimal {
        to_weight_kg(self.target_total_kg - self.produced_kg)
    }
}

/// A single produced roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRoll {
    /// Roll id.
    pub id: OrderRollId,
    /// Order the roll belongs to.
    pub order_id: OrderId,
    /// Roll weight in kg.
    pub weight_kg: Decimal,
}

/// Smallest weight a roll may record.
pub const MIN_ROLL_WEIGHT_KG: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Validates a roll weight and normalizes it to 3 decimals.
///
/// # Errors
///
/// Returns `OrderError::RollTooLight` if the weight is below 0.001 kg.
pub fn validate_roll_weight(weight_kg: Decimal) -> Result<Decimal, OrderError> {
    let weight_kg = to_weight_kg(weight_kg);
    if weight_kg < MIN_ROLL_WEIGHT_KG {
        return Err(OrderError::RollTooLight { weight_kg });
    }
    Ok(weight_kg)
}

/// Produced weight of an order.
#[must_use]
pub fn produced_kg(rolls: &[OrderRoll]) -> Decimal {
    to_weight_kg(rolls.iter().map(|r| r.weight_kg).sum())
}

/// Formats a sequential invoice number.
#[must_use]
pub fn invoice_number(sequence: u64) -> String {
    format!("SSP-{sequence:05}")
}

/// Extracts the sequence from an invoice number.
#[must_use]
pub fn invoice_sequence(invoice_number: &str) -> Option<u64> {
    invoice_number.strip_prefix("SSP-")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(),
            customer_id: CustomerId::new(),
            invoice_number: invoice_number(1),
            order_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            status,
            target_total_kg: dec!(100),
            produced_kg: dec!(99.6),
            price_per_kg: dec!(450.50),
            include_tax: false,
            tolerance_kg: dec!(0.5),
            material_type: None,
        }
    }

    #[rstest]
    #[case(OrderStatus::Draft, false, false)]
    #[case(OrderStatus::Confirmed, false, true)]
    #[case(OrderStatus::InProduction, false, true)]
    #[case(OrderStatus::Ready, true, true)]
    #[case(OrderStatus::Delivered, true, true)]
    #[case(OrderStatus::Closed, true, true)]
    fn test_status_sets(#[case] status: OrderStatus, #[case] is_final: bool, #[case] consumes: bool) {
        assert_eq!(status.is_final(), is_final);
        assert_eq!(status.consumes_material(), consumes);
        assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
    }

    #[test]
    fn test_legacy_status_label() {
        assert_eq!("INPROD".parse::<OrderStatus>().unwrap(), OrderStatus::InProduction);
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_billable_kg_switches_to_produced_when_final() {
        assert_eq!(order(OrderStatus::Confirmed).billable_kg(), dec!(100));
        assert_eq!(order(OrderStatus::Ready).billable_kg(), dec!(99.6));
        assert_eq!(order(OrderStatus::Ready).remaining_kg(), dec!(0.4));
    }

    #[test]
    fn test_produced_kg_sums_rolls() {
        let order_id = OrderId::new();
        let rolls: Vec<OrderRoll> = [dec!(24.5), dec!(25.25), dec!(0.001)]
            .into_iter()
            .map(|weight_kg| OrderRoll {
                id: OrderRollId::new(),
                order_id,
                weight_kg,
            })
            .collect();
        assert_eq!(produced_kg(&rolls).to_string(), "49.751");
        assert_eq!(produced_kg(&[]).to_string(), "0.000");
    }

    #[test]
    fn test_roll_weight_minimum() {
        assert_eq!(validate_roll_weight(dec!(0.001)).unwrap(), dec!(0.001));
        assert!(matches!(
            validate_roll_weight(dec!(0.0004)),
            Err(OrderError::RollTooLight { .. })
        ));
    }

    #[test]
    fn test_invoice_numbers() {
        assert_eq!(invoice_number(42), "SSP-00042");
        assert_eq!(invoice_number(123_456), "SSP-123456");
        assert_eq!(invoice_sequence("SSP-00042"), Some(42));
        assert_eq!(invoice_sequence("INV-1"), None);
    }
}
