//! Integration tests for the material ledger repository.
//!
//! Covers rows keyed by their source, removal with the source, balances and
//! period movement on an in-memory SQLite database.

mod common;

use chrono::NaiveDate;
use common::{Repos, create_customer, date, receive, settings, setup};
use polyroll_core::material::{EntryType, MaterialKind, Party};
use polyroll_db::MaterialLedgerRepository;
use polyroll_db::entities::material_ledger_entries;
use polyroll_db::repositories::{ReceiptInput, RepositoryError};
use polyroll_shared::types::CustomerId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

// ============================================================================
// Rows keyed by their source
// ============================================================================

fn receipt_input(customer_id: CustomerId, on: NaiveDate, kg: Decimal, is_opening_adjustment: bool) -> ReceiptInput {
    ReceiptInput {
        customer_id,
        received_on: on,
        material_type: Some(MaterialKind::Film),
        bags_count: 0,
        extra_kg: kg,
        notes: String::new(),
        is_opening_adjustment,
    }
}

#[tokio::test]
async fn test_receipt_edit_replaces_row_with_same_key() {
    let db = setup().await;
    let repos = Repos::new(&db, &settings());
    let ledger = MaterialLedgerRepository::new(db.clone());
    let customer = create_customer(&repos, "Acme Polymers", 0).await;
    let party = Party::Customer(customer.id);
    let receipt = receive(&repos, customer.id, date(2026, 3, 1), dec!(40)).await;

    let edited = receipt_input(customer.id, date(2026, 3, 2), dec!(55), false);
    repos.receipts.update(receipt.id, edited.clone()).await.unwrap();
    repos.receipts.update(receipt.id, edited).await.unwrap();

    let rows = material_ledger_entries::Entity::find()
        .filter(material_ledger_entries::Column::ReceiptId.eq(receipt.id.into_inner()))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(ledger.balance_as_of(party, date(2026, 3, 1)).await.unwrap(), dec!(0));
    assert_eq!(ledger.balance_as_of(party, date(2026, 3, 31)).await.unwrap(), dec!(55.000));
}

#[tokio::test]
async fn test_receipt_row_flips_direction_without_duplicating() {
    let db = setup().await;
    let repos = Repos::new(&db, &settings());
    let ledger = MaterialLedgerRepository::new(db.clone());
    let customer = create_customer(&repos, "Acme Polymers", 0).await;
    let receipt = receive(&repos, customer.id, date(2026, 3, 1), dec!(40)).await;
    let party = Party::Customer(customer.id);

    let correction = receipt_input(customer.id, date(2026, 3, 1), dec!(-5), true);
    repos.receipts.update(receipt.id, correction).await.unwrap();

    let rows = ledger.list_for_party(party).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entry_type, EntryType::Out);
    assert_eq!(rows[0].receipt_id, Some(receipt.id));
    assert_eq!(ledger.balance_as_of(party, date(2026, 3, 1)).await.unwrap(), dec!(-5));
}

#[tokio::test]
async fn test_deleting_sources_removes_rows_and_refreshes_balance() {
    let db = setup().await;
    let repos = Repos::new(&db, &settings());
    let ledger = MaterialLedgerRepository::new(db.clone());
    let customer = create_customer(&repos, "Acme Polymers", 0).await;
    let party = Party::Customer(customer.id);
    let receipt = receive(&repos, customer.id, date(2026, 3, 1), dec!(40)).await;
    let order = common::billed_order(&repos, customer.id, date(2026, 3, 3), dec!(50)).await;

    // 10 kg short at 10 per kg.
    let pending = repos
        .customers
        .set_surcharge_override(customer.id, Some(true), Some(dec!(10)))
        .await
        .unwrap();
    assert_eq!(pending, 50 + 100);

    repos.receipts.delete(receipt.id).await.unwrap();
    assert_eq!(ledger.balance_as_of(party, date(2026, 3, 31)).await.unwrap(), dec!(-50));
    assert_eq!(repos.customers.find_by_id(customer.id).await.unwrap().pending_balance, 50 + 500);

    repos.orders.delete_order(order.id).await.unwrap();
    assert!(ledger.list_for_party(party).await.unwrap().is_empty());
    assert_eq!(repos.customers.find_by_id(customer.id).await.unwrap().pending_balance, 0);
}

// ============================================================================
// Balances
// ============================================================================

#[tokio::test]
async fn test_balance_is_sum_up_to_cutoff() {
    let db = setup().await;
    let repos = Repos::new(&db, &settings());
    let ledger = MaterialLedgerRepository::new(db.clone());
    let customer = create_customer(&repos, "Acme Polymers", 0).await;
    let party = Party::Customer(customer.id);

    receive(&repos, customer.id, date(2026, 3, 1), dec!(100)).await;
    receive(&repos, customer.id, date(2026, 3, 10), dec!(25.5)).await;
    common::billed_order(&repos, customer.id, date(2026, 3, 5), dec!(30)).await;

    assert_eq!(ledger.balance_as_of(party, date(2026, 2, 28)).await.unwrap(), dec!(0));
    assert_eq!(ledger.balance_as_of(party, date(2026, 3, 4)).await.unwrap(), dec!(100));
    assert_eq!(ledger.balance_as_of(party, date(2026, 3, 5)).await.unwrap(), dec!(70));
    assert_eq!(ledger.balance_as_of(party, date(2026, 3, 31)).await.unwrap(), dec!(95.5));

    let movement = ledger
        .period_movement(party, date(2026, 3, 2), date(2026, 3, 31))
        .await
        .unwrap();
    assert_eq!(movement.in_kg, dec!(25.5));
    assert_eq!(movement.out_kg, dec!(30));
}

#[tokio::test]
async fn test_period_movement_rejects_inverted_period() {
    let db = setup().await;
    let ledger = MaterialLedgerRepository::new(db.clone());

    let err = ledger
        .period_movement(Party::CompanyStock, date(2026, 3, 31), date(2026, 3, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Material(_)));
}
