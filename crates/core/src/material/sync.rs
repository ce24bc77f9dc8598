//! Rules that derive ledger rows from orders.

use polyroll_shared::types::to_weight_kg;
use serde::{Deserialize, Serialize};

use super::entry::{LedgerKey, LedgerPosting, LedgerSource, Party};
use super::error::MaterialError;
use crate::orders::Order;

/// What the ledger must look like for a source fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncAction {
    /// Insert or replace the row with this key.
    Upsert(LedgerPosting),
    /// Delete the row with this key, if any.
    Remove(LedgerKey),
}

impl SyncAction {
    /// Key the action applies to.
    #[must_use]
    pub const fn key(&self) -> &LedgerKey {
        match self {
            Self::Upsert(posting) => &posting.key,
            Self::Remove(key) => key,
        }
    }
}

/// Consumption row of an order.
///
/// A consuming status with a positive target yields one OUT row of
/// `-target_total_kg` dated on the order date; anything else removes it.
pub fn order_consumption(order: &Order) -> Result<SyncAction, MaterialError> {
    let target = to_weight_kg(order.target_total_kg);
    if !order.status.consumes_material() || target <= rust_decimal::Decimal::ZERO {
        return Ok(SyncAction::Remove(LedgerKey::order_consumption(order.id)));
    }

    let posting = LedgerPosting::new(
        LedgerSource::Order(order.id),
        Party::Customer(order.customer_id),
        -target,
        order.order_date,
    )?
    .with_material_type(order.material_type)
    .with_memo(format!("Consumption for Order {}", order.invoice_number));

    Ok(SyncAction::Upsert(posting))
}
