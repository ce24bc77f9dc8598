//! Repositories over the `SeaORM` entities.
//!
//! Each public method is one database transaction. Internal helpers are
//! generic over `ConnectionTrait` so hooks compose inside the caller's
//! transaction instead of opening their own.

pub mod customer;
pub mod error;
pub mod material_ledger;
pub mod order;
pub mod payables;
pub mod raw_material;
pub mod receipt;
pub mod receivables;

mod mapping;

pub use customer::{CreateCustomerInput, CustomerRepository};
pub use error::RepositoryError;
pub use material_ledger::MaterialLedgerRepository;
pub use order::{CreateOrderInput, ORDER_SAVE_HOOKS, OrderHook, OrderRepository, UpdateOrderInput};
pub use payables::PayablesRepository;
pub use raw_material::RawMaterialRepository;
pub use receipt::{ReceiptInput, ReceiptRepository};
pub use receivables::{ReceivablesRepository, RecordPaymentInput, UpdatePaymentInput};
