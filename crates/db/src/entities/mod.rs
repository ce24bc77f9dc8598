//! `SeaORM` entity definitions.

pub mod customers;
pub mod material_ledger_entries;
pub mod material_receipts;
pub mod order_rolls;
pub mod orders;
pub mod payment_allocations;
pub mod payments;
pub mod purchase_payment_links;
pub mod raw_material_txns;
pub mod sea_orm_active_enums;
pub mod supplier_payments;
