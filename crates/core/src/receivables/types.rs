//! Payment and allocation domain types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use polyroll_shared::types::{AllocationId, Amount, CustomerId, OrderId, PaymentId};
use serde::{Deserialize, Serialize};

use super::error::AllocationError;

/// How a payment was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Cheque.
    Cheque,
    /// Bank transfer.
    #[default]
    Transfer,
    /// Anything else.
    Other,
}

impl PaymentMethod {
    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Cheque => "CHEQUE",
            Self::Transfer => "TRANSFER",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CASH" => Ok(Self::Cash),
            "CHEQUE" => Ok(Self::Cheque),
            "TRANSFER" => Ok(Self::Transfer),
            "OTHER" => Ok(Self::Other),
            other => Err(AllocationError::UnknownMethod(other.to_string())),
        }
    }
}

/// Cash received from a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment id.
    pub id: PaymentId,
    /// Paying customer.
    pub customer_id: CustomerId,
    /// Date the cash arrived.
    pub received_on: NaiveDate,
    /// Whole units, never negative.
    pub amount: Amount,
    /// Method.
    pub method: PaymentMethod,
    /// Cheque number or bank reference.
    pub reference: String,
    /// Free-text notes.
    pub notes: String,
}

/// Portion of a payment applied to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    /// Allocation id.
    pub id: AllocationId,
    /// Payment the cash comes from.
    pub payment_id: PaymentId,
    /// Order being settled.
    pub order_id: OrderId,
    /// Cash applied.
    pub amount: Amount,
    /// Small write-off, bounded by the allocation tolerance.
    pub rounding_adjustment: Amount,
    /// Date the allocation took effect.
    pub applied_on: NaiveDate,
}

impl PaymentAllocation {
    /// Cash plus write-off credited to the order.
    #[must_use]
    pub const fn effective(&self) -> Amount {
        self.amount + self.rounding_adjustment
    }
}

/// Cash of a payment not yet applied to any order.
#[must_use]
pub fn unapplied_amount(payment: &Payment, allocations: &[PaymentAllocation]) -> Amount {
    payment.amount
        - allocations
            .iter()
            .filter(|a| a.payment_id == payment.id)
            .map(|a| a.amount)
            .sum::<Amount>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unapplied_ignores_other_payments() {
        let payment = Payment {
            id: PaymentId::new(),
            customer_id: CustomerId::new(),
            received_on: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            amount: 500,
            method: PaymentMethod::Cash,
            reference: String::new(),
            notes: String::new(),
        };
        let alloc = |payment_id, amount| PaymentAllocation {
            id: AllocationId::new(),
            payment_id,
            order_id: OrderId::new(),
            amount,
            rounding_adjustment: 3,
            applied_on: payment.received_on,
        };
        let allocations = vec![alloc(payment.id, 200), alloc(payment.id, 100), alloc(PaymentId::new(), 999)];

        assert_eq!(unapplied_amount(&payment, &allocations), 200);
        assert_eq!(allocations[0].effective(), 203);
    }

    #[test]
    fn test_method_labels() {
        assert_eq!("CHEQUE".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cheque);
        assert_eq!(PaymentMethod::default().as_str(), "TRANSFER");
        assert!("CARD".parse::<PaymentMethod>().is_err());
    }
}
