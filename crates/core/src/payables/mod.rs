//! Accounts payable: supplier payments linked to raw-material purchases.

pub mod error;
pub mod settlement;

pub use error::PayablesError;
pub use settlement::{PurchaseSettlement, SupplierPayment, validate_link};
