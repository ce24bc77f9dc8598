//! Customer balance aggregator.
//!
//! Point-in-time pending balance:
//! `carry-forward + Σ final order totals − Σ payments − Σ write-offs + surcharge`.

pub mod account;
pub mod surcharge;

pub use account::{AdjustmentLine, BilledOrder, Customer, CustomerAccount, PaymentLine};
pub use surcharge::SurchargePolicy;
