//! Customer orders.
//!
//! - Status lifecycle and the final/consuming status sets
//! - Billable weight and money totals
//! - Transition rules (material availability, produced tolerance)
//! - Produced rolls and invoice numbering

pub mod error;
pub mod pricing;
pub mod transition;
pub mod types;

pub use error::OrderError;
pub use pricing::{OrderSettlement, OrderTotals};
pub use transition::{available_for_order, validate_order_fields, validate_transition};
pub use types::{
    MIN_ROLL_WEIGHT_KG, Order, OrderRoll, OrderStatus, invoice_number, invoice_sequence,
    produced_kg, validate_roll_weight,
};
