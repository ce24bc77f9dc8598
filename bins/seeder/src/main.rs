//! Demo data seeder for Polyroll development.
//!
//! Creates two customers with receipts, raw-material movements, orders with
//! rolls, payments and a supplier payment, all through the repositories so the
//! ledgers and cached balances stay consistent.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::NaiveDate;
use polyroll_core::material::MaterialKind;
use polyroll_core::orders::OrderStatus;
use polyroll_core::payables::SupplierPayment;
use polyroll_core::raw_material::{RawMaterialTxnInput, TxnKind};
use polyroll_core::receivables::PaymentMethod;
use polyroll_db::repositories::{
    CreateCustomerInput, CreateOrderInput, ReceiptInput, RecordPaymentInput,
};
use polyroll_db::{
    CustomerRepository, OrderRepository, PayablesRepository, RawMaterialRepository,
    ReceiptRepository, ReceivablesRepository, connect,
};
use polyroll_shared::AppConfig;
use polyroll_shared::types::{CustomerId, SupplierPaymentId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SUPPLIER: &str = "Reliance Polymers";

struct Repos {
    customers: CustomerRepository,
    receipts: ReceiptRepository,
    orders: OrderRepository,
    receivables: ReceivablesRepository,
    raw: RawMaterialRepository,
    payables: PayablesRepository,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seeder=info,polyroll_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect(&config.database).await.context("Failed to connect to database")?;
    let settings = config.billing;
    let repos = Repos {
        customers: CustomerRepository::new(db.clone(), settings.clone()),
        receipts: ReceiptRepository::new(db.clone(), settings.clone()),
        orders: OrderRepository::new(db.clone(), settings.clone()),
        receivables: ReceivablesRepository::new(db.clone(), settings.clone()),
        raw: RawMaterialRepository::new(db.clone(), settings),
        payables: PayablesRepository::new(db),
    };

    if !repos.customers.list().await?.is_empty() {
        info!("Customers already exist, skipping seed");
        return Ok(());
    }

    seed_purchases(&repos).await?;
    let acme = seed_customer(&repos, "Acme Polymers", "R. Shah", 12_500).await?;
    let bharat = seed_customer(&repos, "Bharat Packaging", "K. Iyer", 0).await?;

    seed_receipts(&repos, acme).await?;
    seed_sale(&repos, bharat).await?;
    seed_orders(&repos, acme, bharat).await?;
    seed_payments(&repos, acme, bharat).await?;

    for row in repos.customers.balances_report().await? {
        info!(
            company = %row.company,
            material_kg = %row.material_balance_kg,
            outstanding = row.outstanding_amount,
            "seeded balance"
        );
    }
    info!("Seeding complete");
    Ok(())
}

fn day(month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2026, month, day).with_context(|| format!("invalid seed date {month}/{day}"))
}

async fn seed_customer(
    repos: &Repos,
    company_name: &str,
    contact_name: &str,
    carry_forward: i64,
) -> anyhow::Result<CustomerId> {
    let customer = repos
        .customers
        .create(CreateCustomerInput {
            company_name: company_name.to_string(),
            contact_name: contact_name.to_string(),
            phone: "98200 00000".to_string(),
            previous_pending_balance: carry_forward,
            ..CreateCustomerInput::default()
        })
        .await?;
    info!(customer_id = %customer.id, company = company_name, "Created customer");
    Ok(customer.id)
}

/// Company stock bought from the supplier, half of it paid.
async fn seed_purchases(repos: &Repos) -> anyhow::Result<()> {
    let purchase = repos
        .raw
        .apply(&RawMaterialTxnInput {
            kind: TxnKind::Purchase,
            txn_date: day(1, 5)?,
            supplier_name: SUPPLIER.to_string(),
            from_customer: None,
            to_customer: None,
            qty_kg: Decimal::ZERO,
            bags_count: 40,
            rate: dec!(92.50),
            amount: None,
            material_type: MaterialKind::Film,
            dc_number: "DC-1001".to_string(),
            memo: "January lot".to_string(),
        })
        .await?;

    let payment = repos
        .payables
        .record_payment(SupplierPayment {
            id: SupplierPaymentId::new(),
            supplier_name: SUPPLIER.to_string(),
            paid_on: day(1, 20)?,
            method: PaymentMethod::Transfer,
            bank: "HDFC".to_string(),
            reference: "NEFT 55120".to_string(),
            amount: purchase.txn.amount / 2,
            notes: String::new(),
        })
        .await?;
    repos.payables.link(purchase.id, payment.id).await?;
    info!(raw_txn_id = %purchase.id, amount = purchase.txn.amount, "Created purchase");
    Ok(())
}

async fn seed_receipts(repos: &Repos, customer_id: CustomerId) -> anyhow::Result<()> {
    let receipts = [
        (day(1, 10)?, 0, dec!(-35), "Opening balance", true),
        (day(1, 12)?, 12, dec!(4.5), "Truck 7", false),
        (day(2, 3)?, 8, Decimal::ZERO, "Truck 9", false),
    ];
    for (received_on, bags_count, extra_kg, notes, is_opening_adjustment) in receipts {
        repos
            .receipts
            .create(ReceiptInput {
                customer_id,
                received_on,
                material_type: Some(MaterialKind::Film),
                bags_count,
                extra_kg,
                notes: notes.to_string(),
                is_opening_adjustment,
            })
            .await?;
    }
    info!(customer_id = %customer_id, count = receipts.len(), "Created receipts");
    Ok(())
}

async fn seed_sale(repos: &Repos, customer_id: CustomerId) -> anyhow::Result<()> {
    repos
        .raw
        .apply(&RawMaterialTxnInput {
            kind: TxnKind::Sale,
            txn_date: day(1, 15)?,
            supplier_name: String::new(),
            from_customer: None,
            to_customer: Some(customer_id),
            qty_kg: dec!(150),
            bags_count: 0,
            rate: dec!(105),
            amount: None,
            material_type: MaterialKind::Film,
            dc_number: "DC-1002".to_string(),
            memo: String::new(),
        })
        .await?;
    Ok(())
}

async fn seed_orders(repos: &Repos, acme: CustomerId, bharat: CustomerId) -> anyhow::Result<()> {
    let plans = [
        (acme, day(1, 18)?, dec!(120), dec!(305.50), vec![dec!(60.2), dec!(59.9)], OrderStatus::Delivered),
        (acme, day(2, 8)?, dec!(90), dec!(310), vec![dec!(45.1)], OrderStatus::InProduction),
        (bharat, day(1, 25)?, dec!(140), dec!(298), vec![dec!(70), dec!(70.3)], OrderStatus::Ready),
    ];

    for (customer_id, order_date, target, price, rolls, status) in plans {
        let order = repos
            .orders
            .create_order(CreateOrderInput {
                customer_id,
                order_date,
                status: OrderStatus::Confirmed,
                target_total_kg: target,
                price_per_kg: price,
                include_tax: true,
                tolerance_kg: None,
                material_type: Some(MaterialKind::Film),
            })
            .await?;
        for weight in rolls {
            repos.orders.add_roll(order.id, weight).await?;
        }
        let order = repos.orders.set_status(order.id, status).await?;
        info!(invoice_number = %order.invoice_number, status = %order.status, "Created order");
    }
    Ok(())
}

async fn seed_payments(repos: &Repos, acme: CustomerId, bharat: CustomerId) -> anyhow::Result<()> {
    let payments = [
        (acme, day(2, 1)?, 25_000, PaymentMethod::Cheque, "CHQ 004512"),
        (bharat, day(2, 10)?, 50_000, PaymentMethod::Transfer, "NEFT 7781"),
    ];
    for (customer_id, received_on, amount, method, reference) in payments {
        let (payment, allocations) = repos
            .receivables
            .record_payment(RecordPaymentInput {
                customer_id,
                received_on,
                amount,
                method,
                reference: reference.to_string(),
                notes: String::new(),
            })
            .await?;
        info!(payment_id = %payment.id, allocations = allocations.len(), "Created payment");
    }
    Ok(())
}
