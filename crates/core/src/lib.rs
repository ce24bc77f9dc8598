//! Core business logic for Polyroll.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `material` - Material ledger, balances and sync rules
//! - `orders` - Order lifecycle, pricing and transition checks
//! - `raw_material` - Purchases, sales and transfers of raw material
//! - `receivables` - Payments, allocations and FIFO auto-allocation
//! - `balance` - Customer pending balance aggregation
//! - `statement` - Period statements and the balances export
//! - `payables` - Supplier payments and purchase settlement

pub mod balance;
pub mod material;
pub mod orders;
pub mod payables;
pub mod raw_material;
pub mod receivables;
pub mod statement;
