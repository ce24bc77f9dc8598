//! Material ledger domain types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use polyroll_shared::types::{
    CustomerId, LedgerEntryId, OrderId, RawMaterialTxnId, ReceiptId, to_weight_kg,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::MaterialError;

/// Direction of a material movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    /// Material received (positive delta).
    In,
    /// Material consumed or sent away (negative delta).
    Out,
}

impl EntryType {
    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }

    /// Picks the entry type matching the sign of a delta.
    #[must_use]
    pub fn for_delta(delta_kg: Decimal) -> Self {
        if delta_kg.is_sign_negative() {
            Self::Out
        } else {
            Self::In
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = MaterialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            other => Err(MaterialError::UnknownValue(other.to_string())),
        }
    }
}

/// Informational material category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaterialKind {
    /// Polythene film.
    Film,
    /// Tape.
    Tape,
}

impl MaterialKind {
    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Film => "FILM",
            Self::Tape => "TAPE",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialKind {
    type Err = MaterialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FILM" => Ok(Self::Film),
            "TAPE" => Ok(Self::Tape),
            other => Err(MaterialError::UnknownValue(other.to_string())),
        }
    }
}

/// Owner of a material balance.
///
/// Company stock is its own variant, never a customer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Party {
    /// A customer's material held by the factory.
    Customer(CustomerId),
    /// Material owned by the business itself.
    CompanyStock,
}

impl Party {
    /// Returns the customer id, if this party is a customer.
    #[must_use]
    pub const fn customer_id(self) -> Option<CustomerId> {
        match self {
            Self::Customer(id) => Some(id),
            Self::CompanyStock => None,
        }
    }

    /// Returns true for the company stock bucket.
    #[must_use]
    pub const fn is_company_stock(self) -> bool {
        matches!(self, Self::CompanyStock)
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer(id) => write!(f, "customer {id}"),
            Self::CompanyStock => f.write_str("company stock"),
        }
    }
}

/// The fact a ledger row was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerSource {
    /// Consumption by an order.
    Order(OrderId),
    /// A material receipt.
    Receipt(ReceiptId),
    /// A raw-material purchase, sale or transfer.
    RawTxn(RawMaterialTxnId),
}

/// Identity of a derived ledger row.
///
/// Orders and raw-material transactions own one row per entry type. A receipt
/// owns exactly one row whose type follows the sign of its total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerKey {
    /// Source fact.
    pub source: LedgerSource,
    /// Entry direction.
    pub entry_type: EntryType,
}

impl LedgerKey {
    /// Key of an order's consumption row.
    #[must_use]
    pub const fn order_consumption(order_id: OrderId) -> Self {
        Self {
            source: LedgerSource::Order(order_id),
            entry_type: EntryType::Out,
        }
    }

    /// Returns true when the entry type is part of the row identity.
    #[must_use]
    pub const fn entry_type_is_identity(&self) -> bool {
        !matches!(self.source, LedgerSource::Receipt(_))
    }
}

/// A row to write into the material ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPosting {
    /// Upsert identity.
    pub key: LedgerKey,
    /// Balance owner.
    pub party: Party,
    /// Signed kg, 3 decimals. IN positive, OUT negative.
    pub delta_kg: Decimal,
    /// Business date of the movement.
    pub date: NaiveDate,
    /// Optional category tag.
    pub material_type: Option<MaterialKind>,
    /// Human-readable description.
    pub memo: String,
}

impl LedgerPosting {
    /// Builds a posting, normalizing the delta and deriving the entry type from its sign.
    ///
    /// # Errors
    ///
    /// Returns `MaterialError::ZeroDelta` if the normalized delta is zero.
    pub fn new(
        source: LedgerSource,
        party: Party,
        delta_kg: Decimal,
        date: NaiveDate,
    ) -> Result<Self, MaterialError> {
        let delta_kg = to_weight_kg(delta_kg);
        if delta_kg.is_zero() {
            return Err(MaterialError::ZeroDelta);
        }
        Ok(Self {
            key: LedgerKey {
                source,
                entry_type: EntryType::for_delta(delta_kg),
            },
            party,
            delta_kg,
            date,
            material_type: None,
            memo: String::new(),
        })
    }

    /// Sets the material category.
    #[must_use]
    pub fn with_material_type(mut self, material_type: Option<MaterialKind>) -> Self {
        self.material_type = material_type;
        self
    }

    /// Sets the memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }
}

/// A persisted material ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialLedgerEntry {
    /// Row id.
    pub id: LedgerEntryId,
    /// Balance owner.
    pub party: Party,
    /// Entry direction.
    pub entry_type: EntryType,
    /// Signed kg, 3 decimals.
    pub delta_kg: Decimal,
    /// Business date.
    pub date: NaiveDate,
    /// Optional category tag.
    pub material_type: Option<MaterialKind>,
    /// Description.
    pub memo: String,
    /// Order that consumed the material.
    pub order_id: Option<OrderId>,
    /// Receipt that brought the material in.
    pub receipt_id: Option<ReceiptId>,
    /// Raw-material transaction that moved the material.
    pub raw_txn_id: Option<RawMaterialTxnId>,
}

impl MaterialLedgerEntry {
    /// Returns the fact this row was derived from, if it is still linked.
    #[must_use]
    pub fn source(&self) -> Option<LedgerSource> {
        self.order_id
            .map(LedgerSource::Order)
            .or(self.receipt_id.map(LedgerSource::Receipt))
            .or(self.raw_txn_id.map(LedgerSource::RawTxn))
    }

    /// Returns true if the row belongs to the given party.
    #[must_use]
    pub fn is_owned_by(&self, party: Party) -> bool {
        self.party == party
    }
}
