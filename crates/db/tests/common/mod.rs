//! Shared fixtures for repository integration tests.
//!
//! Every test gets its own in-memory SQLite database with the production
//! migration applied. The pool holds a single connection so the database
//! lives as long as the pool.

#![allow(dead_code)]

use chrono::NaiveDate;
use polyroll_core::balance::Customer;
use polyroll_core::material::{MaterialKind, MaterialReceipt};
use polyroll_core::orders::{Order, OrderStatus};
use polyroll_db::migration::{Migrator, MigratorTrait};
use polyroll_db::{
    CustomerRepository, OrderRepository, RawMaterialRepository, ReceiptRepository,
    ReceivablesRepository,
};
use polyroll_db::repositories::{CreateCustomerInput, CreateOrderInput, ReceiptInput};
use polyroll_shared::BillingSettings;
use polyroll_shared::types::{Amount, CustomerId};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Opens a fresh migrated in-memory database.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to run migration");
    db
}

pub fn settings() -> BillingSettings {
    BillingSettings::default()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// All repositories over one connection with the same settings.
pub struct Repos {
    pub customers: CustomerRepository,
    pub orders: OrderRepository,
    pub receipts: ReceiptRepository,
    pub receivables: ReceivablesRepository,
    pub raw: RawMaterialRepository,
}

impl Repos {
    pub fn new(db: &DatabaseConnection, settings: &BillingSettings) -> Self {
        Self {
            customers: CustomerRepository::new(db.clone(), settings.clone()),
            orders: OrderRepository::new(db.clone(), settings.clone()),
            receipts: ReceiptRepository::new(db.clone(), settings.clone()),
            receivables: ReceivablesRepository::new(db.clone(), settings.clone()),
            raw: RawMaterialRepository::new(db.clone(), settings.clone()),
        }
    }
}

pub async fn create_customer(repos: &Repos, name: &str, carry_forward: Amount) -> Customer {
    repos
        .customers
        .create(CreateCustomerInput {
            company_name: name.to_string(),
            contact_name: format!("{name} contact"),
            phone: "98200 00000".to_string(),
            previous_pending_balance: carry_forward,
            ..CreateCustomerInput::default()
        })
        .await
        .expect("Failed to create customer")
}

/// Records loose kg for a customer.
pub async fn receive(repos: &Repos, customer_id: CustomerId, on: NaiveDate, kg: Decimal) -> MaterialReceipt {
    repos
        .receipts
        .create(ReceiptInput {
            customer_id,
            received_on: on,
            material_type: Some(MaterialKind::Film),
            bags_count: 0,
            extra_kg: kg,
            notes: "inward".to_string(),
            is_opening_adjustment: false,
        })
        .await
        .expect("Failed to record receipt")
}

pub fn order_input(customer_id: CustomerId, on: NaiveDate, status: OrderStatus, target_kg: Decimal) -> CreateOrderInput {
    CreateOrderInput {
        customer_id,
        order_date: on,
        status,
        target_total_kg: target_kg,
        price_per_kg: Decimal::ONE,
        include_tax: false,
        tolerance_kg: None,
        material_type: Some(MaterialKind::Film),
    }
}

/// A DELIVERED order whose grand total equals `kg` at a unit price of 1.
pub async fn billed_order(repos: &Repos, customer_id: CustomerId, on: NaiveDate, kg: Decimal) -> Order {
    let order = repos
        .orders
        .create_order(order_input(customer_id, on, OrderStatus::Draft, kg))
        .await
        .expect("Failed to create order");
    repos
        .orders
        .add_roll(order.id, kg)
        .await
        .expect("Failed to add roll");
    repos
        .orders
        .set_status(order.id, OrderStatus::Delivered)
        .await
        .expect("Failed to deliver order")
}
