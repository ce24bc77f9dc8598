//! Order status transition rules.

use polyroll_shared::types::to_weight_kg;
use rust_decimal::Decimal;

use super::error::OrderError;
use super::types::{Order, OrderStatus};

/// Material available to an order: the customer's balance with the order's
/// own consumption row (a negative delta) added back.
#[must_use]
pub fn available_for_order(customer_balance_kg: Decimal, own_consumption_kg: Option<Decimal>) -> Decimal {
    to_weight_kg(customer_balance_kg - own_consumption_kg.unwrap_or(Decimal::ZERO))
}

/// Rejects negative weights, prices and tolerances.
///
/// # Errors
///
/// Returns `OrderError::NegativeValue` naming the first offending field.
pub fn validate_order_fields(order: &Order) -> Result<(), OrderError> {
    let checks = [
        ("target_total_kg", order.target_total_kg),
        ("produced_kg", order.produced_kg),
        ("price_per_kg", order.price_per_kg),
        ("tolerance_kg", order.tolerance_kg),
    ];
    for (field, value) in checks {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(OrderError::NegativeValue { field });
        }
    }
    Ok(())
}

/// Validates moving an order from `previous` (None for a new order) into its
/// current status.
///
/// - Entering CONFIRMED requires `target_total_kg ≤ available_kg`.
/// - Entering a final status requires `|produced − target| ≤ tolerance_kg`.
///
/// # Errors
///
/// Returns `OrderError::InsufficientMaterial` or `OrderError::ToleranceExceeded`.
pub fn validate_transition(
    previous: Option<OrderStatus>,
    order: &Order,
    available_kg: Decimal,
) -> Result<(), OrderError> {
    validate_order_fields(order)?;

    let entering_confirmed =
        order.status == OrderStatus::Confirmed && previous != Some(OrderStatus::Confirmed);
    if entering_confirmed {
        let required = to_weight_kg(order.target_total_kg);
        let available = to_weight_kg(available_kg);
        if required > available {
            return Err(OrderError::InsufficientMaterial { required, available });
        }
    }

    let entering_final = order.status.is_final() && !previous.is_some_and(OrderStatus::is_final);
    if entering_final {
        let produced = to_weight_kg(order.produced_kg);
        let target = to_weight_kg(order.target_total_kg);
        let deviation = (produced - target).abs();
        let tolerance = to_weight_kg(order.tolerance_kg);
        if deviation > tolerance {
            return Err(OrderError::ToleranceExceeded {
                produced,
                target,
                deviation,
                tolerance,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::types::invoice_number;
    use chrono::NaiveDate;
    use polyroll_shared::types::{CustomerId, OrderId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn order(status: OrderStatus, produced_kg: Decimal) -> Order {
        Order {
            id: OrderId::new(),
            customer_id: CustomerId::new(),
            invoice_number: invoice_number(3),
            order_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            status,
            target_total_kg: dec!(100.000),
            produced_kg,
            price_per_kg: dec!(300),
            include_tax: false,
            tolerance_kg: dec!(0.500),
            material_type: None,
        }
    }

    #[rstest]
    #[case(dec!(100.000), true)]
    #[case(dec!(150), true)]
    #[case(dec!(99.999), false)]
    fn test_confirm_requires_material(#[case] available: Decimal, #[case] ok: bool) {
        let result = validate_transition(
            Some(OrderStatus::Draft),
            &order(OrderStatus::Confirmed, Decimal::ZERO),
            available,
        );
        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn test_staying_confirmed_skips_material_check() {
        let result = validate_transition(
            Some(OrderStatus::Confirmed),
            &order(OrderStatus::Confirmed, Decimal::ZERO),
            Decimal::ZERO,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_new_confirmed_order_is_checked() {
        let result = validate_transition(None, &order(OrderStatus::Confirmed, Decimal::ZERO), dec!(10));
        assert!(matches!(result, Err(OrderError::InsufficientMaterial { .. })));
    }

    #[rstest]
    #[case(dec!(99.500), true)]
    #[case(dec!(100.500), true)]
    #[case(dec!(99.499), false)]
    #[case(dec!(100.501), false)]
    fn test_finalizing_enforces_tolerance(#[case] produced: Decimal, #[case] ok: bool) {
        let result = validate_transition(
            Some(OrderStatus::InProduction),
            &order(OrderStatus::Ready, produced),
            Decimal::ZERO,
        );
        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn test_moving_between_final_states_skips_tolerance() {
        let result = validate_transition(
            Some(OrderStatus::Ready),
            &order(OrderStatus::Delivered, dec!(50)),
            Decimal::ZERO,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_available_adds_back_own_consumption() {
        assert_eq!(available_for_order(dec!(0), Some(dec!(-100))), dec!(100));
        assert_eq!(available_for_order(dec!(40), None), dec!(40));
    }

    #[test]
    fn test_negative_fields_rejected() {
        let mut o = order(OrderStatus::Draft, Decimal::ZERO);
        o.price_per_kg = dec!(-1);
        assert!(matches!(
            validate_order_fields(&o),
            Err(OrderError::NegativeValue { field: "price_per_kg" })
        ));
    }
}
