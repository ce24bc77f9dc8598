//! Raw-material purchases, sales and transfers.

pub mod error;
pub mod service;
pub mod types;

pub use error::RawMaterialError;
pub use service::{COMPANY_STOCK_NAME, RawMaterialService};
pub use types::{NormalizedTxn, RawMaterialTxn, RawMaterialTxnInput, TxnKind};
