//! Application configuration management.
//!
//! Billing rules that used to live in a mutable site-settings record are
//! loaded once into [`BillingSettings`] and passed explicitly to the services
//! that need them.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppError;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Billing rules.
    #[serde(default)]
    pub billing: BillingSettings,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Billing rules shared by the balance aggregator, the allocation ledger and
/// the raw-material engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BillingSettings {
    /// Tax rate in percent applied to orders with `include_tax`.
    #[serde(default)]
    pub tax_rate_percent: Decimal,
    /// Cap for rounding adjustments and the order-outstanding tolerance.
    #[serde(default = "default_allocation_tolerance")]
    pub allocation_tolerance: i64,
    /// Produced/target deviation allowed when an order has no tolerance of its own.
    #[serde(default = "default_tolerance_kg")]
    pub default_tolerance_kg: Decimal,
    /// Negative-material surcharge.
    #[serde(default)]
    pub shortfall: ShortfallSettings,
    /// Raw-material transaction conventions.
    #[serde(default)]
    pub raw_material: RawMaterialSettings,
}

fn default_allocation_tolerance() -> i64 {
    100
}

fn default_tolerance_kg() -> Decimal {
    Decimal::new(500, 3)
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            tax_rate_percent: Decimal::ZERO,
            allocation_tolerance: default_allocation_tolerance(),
            default_tolerance_kg: default_tolerance_kg(),
            shortfall: ShortfallSettings::default(),
            raw_material: RawMaterialSettings::default(),
        }
    }
}

impl BillingSettings {
    /// Returns the tax rate as a ratio (18% -> 0.18).
    #[must_use]
    pub fn tax_ratio(&self) -> Decimal {
        self.tax_rate_percent / Decimal::ONE_HUNDRED
    }

    /// Checks the settings for values no billing rule can work with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.tax_rate_percent.is_sign_negative() {
            return Err(AppError::Configuration(
                "billing.tax_rate_percent must not be negative".into(),
            ));
        }
        if self.allocation_tolerance < 0 {
            return Err(AppError::Configuration(
                "billing.allocation_tolerance must not be negative".into(),
            ));
        }
        if self.default_tolerance_kg.is_sign_negative() {
            return Err(AppError::Configuration(
                "billing.default_tolerance_kg must not be negative".into(),
            ));
        }
        if self.raw_material.bag_weight_kg <= Decimal::ZERO {
            return Err(AppError::Configuration(
                "billing.raw_material.bag_weight_kg must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Surcharge applied when a customer's material balance is negative.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShortfallSettings {
    /// Global toggle; customers may override it.
    #[serde(default)]
    pub enabled: bool,
    /// Charge per kg of shortfall when the customer has no rate of its own.
    #[serde(default)]
    pub default_rate_per_kg: Decimal,
    /// Label used on statements.
    #[serde(default = "default_shortfall_label")]
    pub label: String,
}

fn default_shortfall_label() -> String {
    "Material shortfall charge".to_string()
}

impl Default for ShortfallSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            default_rate_per_kg: Decimal::ZERO,
            label: default_shortfall_label(),
        }
    }
}

/// Raw-material transaction conventions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawMaterialSettings {
    /// Weight of one bag in kg.
    #[serde(default = "default_bag_weight_kg")]
    pub bag_weight_kg: Decimal,
    /// Formula for the commercial amount of purchases and sales.
    #[serde(default)]
    pub amount_formula: AmountFormula,
}

fn default_bag_weight_kg() -> Decimal {
    Decimal::new(25_000, 3)
}

impl Default for RawMaterialSettings {
    fn default() -> Self {
        Self {
            bag_weight_kg: default_bag_weight_kg(),
            amount_formula: AmountFormula::default(),
        }
    }
}

/// Commercial amount of a purchase or sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AmountFormula {
    /// `amount = rate × qty_kg`
    #[default]
    PerKg,
    /// `amount = rate × (qty_kg / bag_weight_kg) × multiplier`
    PerBag {
        /// Constant applied per bag.
        multiplier: Decimal,
    },
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails validation.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("POLYROLL").separator("__"))
            .build()?;

        if config.get::<Decimal>("billing.tax_rate_percent").is_err() {
            tracing::warn!("billing.tax_rate_percent not configured, orders are billed without tax");
        }

        let app: Self = config.try_deserialize()?;
        app.billing.validate()?;
        Ok(app)
    }
}
