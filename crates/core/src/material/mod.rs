//! Material ledger.
//!
//! Single source of truth for material balances: a log of signed kg deltas
//! per party, each row derived from an order, a receipt or a raw-material
//! transaction and keyed so that re-deriving it replaces instead of duplicating.
//!
//! - Ledger entries, parties and upsert keys
//! - Balance and period movement calculations
//! - Order consumption and receipt sync rules

pub mod balance;
pub mod entry;
pub mod error;
pub mod receipt;
pub mod sync;

#[cfg(test)]
mod balance_props;

pub use balance::{MaterialSummary, PeriodMovement, balance_as_of, period_movement};
pub use entry::{
    EntryType, LedgerKey, LedgerPosting, LedgerSource, MaterialKind, MaterialLedgerEntry, Party,
};
pub use error::MaterialError;
pub use receipt::{MaterialReceipt, receipt_sync};
pub use sync::{SyncAction, order_consumption};
