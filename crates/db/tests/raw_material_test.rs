//! Integration tests for raw-material transactions and their ledger rows.

mod common;

use common::{Repos, create_customer, date, settings, setup};
use polyroll_core::material::{EntryType, MaterialKind, Party};
use polyroll_core::raw_material::{RawMaterialError, RawMaterialTxnInput, TxnKind};
use polyroll_db::MaterialLedgerRepository;
use polyroll_db::entities::material_ledger_entries;
use polyroll_db::repositories::RepositoryError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};

fn txn(kind: TxnKind, qty_kg: Decimal, rate: Decimal) -> RawMaterialTxnInput {
    RawMaterialTxnInput {
        kind,
        txn_date: date(2026, 4, 2),
        supplier_name: String::new(),
        from_customer: None,
        to_customer: None,
        qty_kg,
        bags_count: 0,
        rate,
        amount: None,
        material_type: MaterialKind::Film,
        dc_number: "DC-118".to_string(),
        memo: String::new(),
    }
}

// ============================================================================
// Apply
// ============================================================================

#[tokio::test]
async fn test_purchase_credits_company_stock() {
    let db = setup().await;
    let repos = Repos::new(&db, &settings());
    let ledger = MaterialLedgerRepository::new(db.clone());

    let input = RawMaterialTxnInput {
        supplier_name: "  Reliance Polymers ".to_string(),
        ..txn(TxnKind::Purchase, dec!(500), dec!(92.50))
    };
    let applied = repos.raw.apply(&input).await.unwrap();

    assert_eq!(applied.txn.supplier_name.as_deref(), Some("Reliance Polymers"));
    assert_eq!(applied.txn.amount, 46_250);

    let rows = ledger.list_for_party(Party::CompanyStock).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entry_type, EntryType::In);
    assert_eq!(rows[0].delta_kg, dec!(500));
    assert_eq!(rows[0].raw_txn_id, Some(applied.id));
    assert_eq!(material_ledger_entries::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_sale_moves_stock_to_customer() {
    let db = setup().await;
    let repos = Repos::new(&db, &settings());
    let ledger = MaterialLedgerRepository::new(db.clone());
    let customer = create_customer(&repos, "Acme Polymers", 0).await;

    let input = RawMaterialTxnInput {
        to_customer: Some(customer.id),
        ..txn(TxnKind::Sale, dec!(120.25), dec!(100))
    };
    let applied = repos.raw.apply(&input).await.unwrap();
    assert_eq!(applied.txn.from, Some(Party::CompanyStock));
    assert_eq!(applied.txn.amount, 12_025);

    let stock = ledger.list_for_party(Party::CompanyStock).await.unwrap();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0].entry_type, EntryType::Out);
    assert_eq!(stock[0].delta_kg, dec!(-120.25));

    let party = Party::Customer(customer.id);
    let received = ledger.list_for_party(party).await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].entry_type, EntryType::In);
    assert_eq!(ledger.balance_as_of(party, date(2026, 4, 30)).await.unwrap(), dec!(120.25));
}

#[tokio::test]
async fn test_transfer_between_customers_keeps_explicit_amount() {
    let db = setup().await;
    let repos = Repos::new(&db, &settings());
    let ledger = MaterialLedgerRepository::new(db.clone());
    let from = create_customer(&repos, "Acme Polymers", 0).await;
    let to = create_customer(&repos, "Bharat Packaging", 0).await;

    let input = RawMaterialTxnInput {
        from_customer: Some(from.id),
        to_customer: Some(to.id),
        amount: Some(750),
        ..txn(TxnKind::Transfer, dec!(25), dec!(80))
    };
    let applied = repos.raw.apply(&input).await.unwrap();
    assert_eq!(applied.txn.amount, 750);

    let cutoff = date(2026, 4, 30);
    assert_eq!(ledger.balance_as_of(Party::Customer(from.id), cutoff).await.unwrap(), dec!(-25));
    assert_eq!(ledger.balance_as_of(Party::Customer(to.id), cutoff).await.unwrap(), dec!(25));
    assert!(ledger.list_for_party(Party::CompanyStock).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bags_override_quantity() {
    let db = setup().await;
    let repos = Repos::new(&db, &settings());

    let input = RawMaterialTxnInput {
        supplier_name: "Reliance Polymers".to_string(),
        bags_count: 4,
        ..txn(TxnKind::Purchase, dec!(1), dec!(10))
    };
    let applied = repos.raw.apply(&input).await.unwrap();
    assert_eq!(applied.txn.qty_kg, dec!(100));
    assert_eq!(applied.txn.amount, 1000);
}

// ============================================================================
// Rejections
// ============================================================================

#[tokio::test]
async fn test_same_transfer_endpoints_write_nothing() {
    let db = setup().await;
    let repos = Repos::new(&db, &settings());
    let customer = create_customer(&repos, "Acme Polymers", 0).await;

    let input = RawMaterialTxnInput {
        from_customer: Some(customer.id),
        to_customer: Some(customer.id),
        ..txn(TxnKind::Transfer, dec!(10), dec!(0))
    };
    let err = repos.raw.apply(&input).await.unwrap_err();

    assert!(matches!(err, RepositoryError::RawMaterial(RawMaterialError::SameTransferEndpoints)));
    assert!(repos.raw.list().await.unwrap().is_empty());
    assert_eq!(material_ledger_entries::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_purchase_without_supplier_rejected() {
    let db = setup().await;
    let repos = Repos::new(&db, &settings());

    let err = repos
        .raw
        .apply(&txn(TxnKind::Purchase, dec!(10), dec!(5)))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "MISSING_SUPPLIER");
}

// ============================================================================
// Reapply and delete
// ============================================================================

#[tokio::test]
async fn test_reapply_sale_as_purchase_removes_customer_row() {
    let db = setup().await;
    let repos = Repos::new(&db, &settings());
    let ledger = MaterialLedgerRepository::new(db.clone());
    let customer = create_customer(&repos, "Acme Polymers", 0).await;

    let sale = RawMaterialTxnInput {
        to_customer: Some(customer.id),
        ..txn(TxnKind::Sale, dec!(60), dec!(100))
    };
    let applied = repos.raw.apply(&sale).await.unwrap();
    assert_eq!(material_ledger_entries::Entity::find().count(&db).await.unwrap(), 2);

    let purchase = RawMaterialTxnInput {
        supplier_name: "Reliance Polymers".to_string(),
        ..txn(TxnKind::Purchase, dec!(60), dec!(90))
    };
    let reapplied = repos.raw.reapply(applied.id, &purchase).await.unwrap();
    assert_eq!(reapplied.txn.kind, TxnKind::Purchase);

    assert!(ledger.list_for_party(Party::Customer(customer.id)).await.unwrap().is_empty());
    let stock = ledger.list_for_party(Party::CompanyStock).await.unwrap();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0].entry_type, EntryType::In);
    assert_eq!(stock[0].delta_kg, dec!(60));

    let stored = repos.raw.find_by_id(applied.id).await.unwrap();
    assert_eq!(stored.txn.amount, 5400);
    assert_eq!(stored.txn.to, Party::CompanyStock);
}

#[tokio::test]
async fn test_delete_removes_rows() {
    let db = setup().await;
    let repos = Repos::new(&db, &settings());
    let customer = create_customer(&repos, "Acme Polymers", 0).await;

    let sale = RawMaterialTxnInput {
        to_customer: Some(customer.id),
        ..txn(TxnKind::Sale, dec!(60), dec!(100))
    };
    let applied = repos.raw.apply(&sale).await.unwrap();
    repos.raw.delete(applied.id).await.unwrap();

    assert_eq!(material_ledger_entries::Entity::find().count(&db).await.unwrap(), 0);
    assert!(matches!(
        repos.raw.find_by_id(applied.id).await,
        Err(RepositoryError::NotFound { .. })
    ));
}
