//! Shared types, normalization, errors, and configuration for Polyroll.
//!
//! This crate provides common types used across all other crates:
//! - Currency and weight normalization (whole-unit money, 3-decimal kilograms)
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management, including the injected billing settings

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, BillingSettings};
pub use error::{AppError, AppResult};
