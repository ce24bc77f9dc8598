//! Raw-material transaction types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use polyroll_shared::types::{Amount, CustomerId, RawMaterialTxnId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::RawMaterialError;
use crate::material::{EntryType, MaterialKind, Party};

/// Kind of raw-material movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxnKind {
    /// Supplier into company stock.
    Purchase,
    /// Company stock to a customer.
    Sale,
    /// Customer to customer.
    Transfer,
}

impl TxnKind {
    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "PURCHASE",
            Self::Sale => "SALE",
            Self::Transfer => "TRANSFER",
        }
    }

    /// Ledger rows the kind produces, keyed by entry type.
    #[must_use]
    pub const fn entry_types(self) -> &'static [EntryType] {
        match self {
            Self::Purchase => &[EntryType::In],
            Self::Sale | Self::Transfer => &[EntryType::Out, EntryType::In],
        }
    }

    /// Whether the commercial amount is derived from rate and quantity.
    #[must_use]
    pub const fn is_commercial(self) -> bool {
        matches!(self, Self::Purchase | Self::Sale)
    }
}

impl fmt::Display for TxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxnKind {
    type Err = RawMaterialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PURCHASE" => Ok(Self::Purchase),
            "SALE" => Ok(Self::Sale),
            "TRANSFER" => Ok(Self::Transfer),
            other => Err(RawMaterialError::UnknownKind(other.to_string())),
        }
    }
}

/// Raw-material transaction as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaterialTxnInput {
    /// Movement kind.
    pub kind: TxnKind,
    /// Business date of the movement.
    pub txn_date: NaiveDate,
    /// Supplier, required for purchases.
    pub supplier_name: String,
    /// Source customer (transfers).
    pub from_customer: Option<CustomerId>,
    /// Destination customer (sales and transfers).
    pub to_customer: Option<CustomerId>,
    /// Explicit kg, used when no bags are given.
    pub qty_kg: Decimal,
    /// Bags; when positive the quantity is `bags × bag weight`.
    pub bags_count: u32,
    /// Rate per kg (or per bag unit), two decimals.
    pub rate: Decimal,
    /// Explicit commercial value, honoured for transfers only.
    pub amount: Option<Amount>,
    /// Material category.
    pub material_type: MaterialKind,
    /// Delivery challan or other reference.
    pub dc_number: String,
    /// Free-text memo.
    pub memo: String,
}

/// A validated transaction with endpoints forced per kind and derived figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTxn {
    /// Movement kind.
    pub kind: TxnKind,
    /// Business date.
    pub txn_date: NaiveDate,
    /// Supplier, purchases only.
    pub supplier_name: Option<String>,
    /// Source party; none for purchases.
    pub from: Option<Party>,
    /// Destination party.
    pub to: Party,
    /// Quantity in kg, 3 decimals, positive.
    pub qty_kg: Decimal,
    /// Bags entered.
    pub bags_count: u32,
    /// Rate, 2 decimals.
    pub rate: Decimal,
    /// Commercial value in whole units.
    pub amount: Amount,
    /// Material category.
    pub material_type: MaterialKind,
    /// Delivery challan or other reference.
    pub dc_number: String,
    /// Free-text memo.
    pub memo: String,
}

/// A persisted raw-material transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaterialTxn {
    /// Transaction id.
    pub id: RawMaterialTxnId,
    /// Normalized content.
    pub txn: NormalizedTxn,
}
