//! Supplier payments and purchase settlement.

use chrono::NaiveDate;
use polyroll_shared::types::{Amount, SupplierPaymentId};
use serde::{Deserialize, Serialize};

use super::error::PayablesError;
use crate::raw_material::TxnKind;
use crate::receivables::PaymentMethod;

/// An outgoing payment to a raw-material supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierPayment {
    /// Payment id.
    pub id: SupplierPaymentId,
    /// Supplier paid.
    pub supplier_name: String,
    /// Date paid.
    pub paid_on: NaiveDate,
    /// Method.
    pub method: PaymentMethod,
    /// Bank the payment was drawn on.
    pub bank: String,
    /// Cheque or transfer reference.
    pub reference: String,
    /// Whole currency units.
    pub amount: Amount,
    /// Free-form notes.
    pub notes: String,
}

impl SupplierPayment {
    /// Trims the supplier name and checks the amount.
    ///
    /// # Errors
    ///
    /// Returns `PayablesError::MissingSupplier` for a blank supplier and
    /// `PayablesError::NegativePayment` for a negative amount.
    pub fn validate(&mut self) -> Result<(), PayablesError> {
        self.supplier_name = self.supplier_name.trim().to_string();
        if self.supplier_name.is_empty() {
            return Err(PayablesError::MissingSupplier);
        }
        if self.amount < 0 {
            return Err(PayablesError::NegativePayment);
        }
        Ok(())
    }
}

/// Only purchases accept supplier payment links.
///
/// # Errors
///
/// Returns `PayablesError::NotAPurchase` for sales and transfers.
pub fn validate_link(kind: TxnKind) -> Result<(), PayablesError> {
    match kind {
        TxnKind::Purchase => Ok(()),
        other => Err(PayablesError::NotAPurchase(other)),
    }
}

/// How much of a purchase has been paid to the supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PurchaseSettlement {
    /// Σ linked payment amounts.
    pub paid: Amount,
    /// `max(amount − paid, 0)`
    pub outstanding: Amount,
}

impl PurchaseSettlement {
    /// Settlement of one transaction; zero for anything but a purchase.
    #[must_use]
    pub fn for_txn(kind: TxnKind, amount: Amount, linked: impl IntoIterator<Item = Amount>) -> Self {
        if kind != TxnKind::Purchase {
            return Self::default();
        }
        let paid: Amount = linked.into_iter().sum();
        Self {
            paid,
            outstanding: (amount - paid).max(0),
        }
    }
}
