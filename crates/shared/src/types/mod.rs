//! Common types used across the application.

pub mod id;
pub mod money;
pub mod weight;

pub use id::*;
pub use money::{
    Amount, amount_to_decimal, format_amount_2dp, normalize_rate, rate_from_hundredths,
    rate_to_hundredths, to_currency_int,
};
pub use weight::{format_kg, grams_from_kg, kg_from_grams, to_weight_kg};
