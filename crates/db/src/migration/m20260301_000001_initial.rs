//! Initial database migration.
//!
//! Creates the customer, order, receivables, material ledger and raw-material
//! tables. Written with the schema builder so the same migration runs on
//! Postgres and on SQLite.
//!
//! Storage units: currency in whole units, weights in grams, rates and prices
//! in hundredths.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: CUSTOMERS & ORDERS
        // ============================================================
        manager.create_table(customers_table()).await?;
        manager.create_table(orders_table()).await?;
        manager.create_table(order_rolls_table()).await?;

        // ============================================================
        // PART 2: RECEIVABLES
        // ============================================================
        manager.create_table(payments_table()).await?;
        manager.create_table(payment_allocations_table()).await?;

        // ============================================================
        // PART 3: RAW MATERIAL & PAYABLES
        // ============================================================
        manager.create_table(material_receipts_table()).await?;
        manager.create_table(raw_material_txns_table()).await?;
        manager.create_table(supplier_payments_table()).await?;
        manager.create_table(purchase_payment_links_table()).await?;

        // ============================================================
        // PART 4: MATERIAL LEDGER
        // ============================================================
        manager.create_table(material_ledger_entries_table()).await?;

        // ============================================================
        // PART 5: INDEXES
        // ============================================================
        for index in indexes() {
            manager.create_index(index).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            MaterialLedgerEntries::Table.into_iden(),
            PurchasePaymentLinks::Table.into_iden(),
            SupplierPayments::Table.into_iden(),
            RawMaterialTxns::Table.into_iden(),
            MaterialReceipts::Table.into_iden(),
            PaymentAllocations::Table.into_iden(),
            Payments::Table.into_iden(),
            OrderRolls::Table.into_iden(),
            Orders::Table.into_iden(),
            Customers::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

// ============================================================
// TABLES
// ============================================================

fn customers_table() -> TableCreateStatement {
    Table::create()
        .table(Customers::Table)
        .if_not_exists()
        .col(ColumnDef::new(Customers::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Customers::CompanyName).string_len(200).not_null())
        .col(ColumnDef::new(Customers::ContactName).string_len(200).not_null().default(""))
        .col(ColumnDef::new(Customers::Phone).string_len(32).not_null().default(""))
        .col(ColumnDef::new(Customers::PreviousPendingBalance).big_integer().not_null().default(0))
        .col(ColumnDef::new(Customers::PendingBalance).big_integer().not_null().default(0))
        .col(ColumnDef::new(Customers::ShortfallEnabled).boolean().null())
        .col(ColumnDef::new(Customers::ShortfallRateHundredths).big_integer().null())
        .col(ColumnDef::new(Customers::CreatedAt).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(Customers::UpdatedAt).timestamp_with_time_zone().not_null())
        .to_owned()
}

fn orders_table() -> TableCreateStatement {
    Table::create()
        .table(Orders::Table)
        .if_not_exists()
        .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
        .col(ColumnDef::new(Orders::InvoiceNumber).string_len(32).not_null().unique_key())
        .col(ColumnDef::new(Orders::OrderDate).date().not_null())
        .col(ColumnDef::new(Orders::Status).string_len(16).not_null())
        .col(ColumnDef::new(Orders::TargetTotalGrams).big_integer().not_null())
        .col(ColumnDef::new(Orders::ProducedGrams).big_integer().not_null().default(0))
        .col(ColumnDef::new(Orders::PricePerKgHundredths).big_integer().not_null())
        .col(ColumnDef::new(Orders::IncludeTax).boolean().not_null().default(true))
        .col(ColumnDef::new(Orders::ToleranceGrams).big_integer().not_null())
        .col(ColumnDef::new(Orders::MaterialType).string_len(8).null())
        .col(ColumnDef::new(Orders::CreatedAt).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(Orders::UpdatedAt).timestamp_with_time_zone().not_null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_orders_customer")
                .from(Orders::Table, Orders::CustomerId)
                .to(Customers::Table, Customers::Id)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .to_owned()
}

fn order_rolls_table() -> TableCreateStatement {
    Table::create()
        .table(OrderRolls::Table)
        .if_not_exists()
        .col(ColumnDef::new(OrderRolls::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(OrderRolls::OrderId).uuid().not_null())
        .col(ColumnDef::new(OrderRolls::WeightGrams).big_integer().not_null())
        .col(ColumnDef::new(OrderRolls::CreatedAt).timestamp_with_time_zone().not_null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_order_rolls_order")
                .from(OrderRolls::Table, OrderRolls::OrderId)
                .to(Orders::Table, Orders::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn payments_table() -> TableCreateStatement {
    Table::create()
        .table(Payments::Table)
        .if_not_exists()
        .col(ColumnDef::new(Payments::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Payments::CustomerId).uuid().not_null())
        .col(ColumnDef::new(Payments::ReceivedOn).date().not_null())
        .col(ColumnDef::new(Payments::Amount).big_integer().not_null())
        .col(ColumnDef::new(Payments::Method).string_len(16).not_null())
        .col(ColumnDef::new(Payments::Reference).string_len(100).not_null().default(""))
        .col(ColumnDef::new(Payments::Notes).text().not_null().default(""))
        .col(ColumnDef::new(Payments::CreatedAt).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(Payments::UpdatedAt).timestamp_with_time_zone().not_null())
        .check(Expr::col(Payments::Amount).gte(0))
        .foreign_key(
            ForeignKey::create()
                .name("fk_payments_customer")
                .from(Payments::Table, Payments::CustomerId)
                .to(Customers::Table, Customers::Id)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .to_owned()
}

fn payment_allocations_table() -> TableCreateStatement {
    Table::create()
        .table(PaymentAllocations::Table)
        .if_not_exists()
        .col(ColumnDef::new(PaymentAllocations::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(PaymentAllocations::PaymentId).uuid().not_null())
        .col(ColumnDef::new(PaymentAllocations::OrderId).uuid().not_null())
        .col(ColumnDef::new(PaymentAllocations::Amount).big_integer().not_null())
        .col(ColumnDef::new(PaymentAllocations::RoundingAdjustment).big_integer().not_null().default(0))
        .col(ColumnDef::new(PaymentAllocations::AppliedOn).date().not_null())
        .col(ColumnDef::new(PaymentAllocations::CreatedAt).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(PaymentAllocations::UpdatedAt).timestamp_with_time_zone().not_null())
        .check(Expr::col(PaymentAllocations::Amount).gte(0))
        .foreign_key(
            ForeignKey::create()
                .name("fk_payment_allocations_payment")
                .from(PaymentAllocations::Table, PaymentAllocations::PaymentId)
                .to(Payments::Table, Payments::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_payment_allocations_order")
                .from(PaymentAllocations::Table, PaymentAllocations::OrderId)
                .to(Orders::Table, Orders::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn material_receipts_table() -> TableCreateStatement {
    Table::create()
        .table(MaterialReceipts::Table)
        .if_not_exists()
        .col(ColumnDef::new(MaterialReceipts::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(MaterialReceipts::CustomerId).uuid().not_null())
        .col(ColumnDef::new(MaterialReceipts::ReceivedOn).date().not_null())
        .col(ColumnDef::new(MaterialReceipts::MaterialType).string_len(8).null())
        .col(ColumnDef::new(MaterialReceipts::BagsCount).integer().not_null().default(0))
        .col(ColumnDef::new(MaterialReceipts::ExtraGrams).big_integer().not_null().default(0))
        .col(ColumnDef::new(MaterialReceipts::Notes).text().not_null().default(""))
        .col(ColumnDef::new(MaterialReceipts::IsOpeningAdjustment).boolean().not_null().default(false))
        .col(ColumnDef::new(MaterialReceipts::CreatedAt).timestamp_with_time_zone().not_null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_material_receipts_customer")
                .from(MaterialReceipts::Table, MaterialReceipts::CustomerId)
                .to(Customers::Table, Customers::Id)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .to_owned()
}

fn raw_material_txns_table() -> TableCreateStatement {
    Table::create()
        .table(RawMaterialTxns::Table)
        .if_not_exists()
        .col(ColumnDef::new(RawMaterialTxns::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(RawMaterialTxns::Kind).string_len(16).not_null())
        .col(ColumnDef::new(RawMaterialTxns::TxnDate).date().not_null())
        .col(ColumnDef::new(RawMaterialTxns::SupplierName).string_len(200).null())
        .col(ColumnDef::new(RawMaterialTxns::FromPartyKind).string_len(16).null())
        .col(ColumnDef::new(RawMaterialTxns::FromCustomerId).uuid().null())
        .col(ColumnDef::new(RawMaterialTxns::ToPartyKind).string_len(16).not_null())
        .col(ColumnDef::new(RawMaterialTxns::ToCustomerId).uuid().null())
        .col(ColumnDef::new(RawMaterialTxns::QtyGrams).big_integer().not_null())
        .col(ColumnDef::new(RawMaterialTxns::BagsCount).integer().not_null().default(0))
        .col(ColumnDef::new(RawMaterialTxns::RateHundredths).big_integer().not_null().default(0))
        .col(ColumnDef::new(RawMaterialTxns::Amount).big_integer().not_null().default(0))
        .col(ColumnDef::new(RawMaterialTxns::MaterialType).string_len(8).not_null())
        .col(ColumnDef::new(RawMaterialTxns::DcNumber).string_len(64).not_null().default(""))
        .col(ColumnDef::new(RawMaterialTxns::Memo).text().not_null().default(""))
        .col(ColumnDef::new(RawMaterialTxns::CreatedAt).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(RawMaterialTxns::UpdatedAt).timestamp_with_time_zone().not_null())
        .check(Expr::col(RawMaterialTxns::QtyGrams).gt(0))
        .foreign_key(
            ForeignKey::create()
                .name("fk_raw_material_txns_from_customer")
                .from(RawMaterialTxns::Table, RawMaterialTxns::FromCustomerId)
                .to(Customers::Table, Customers::Id)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_raw_material_txns_to_customer")
                .from(RawMaterialTxns::Table, RawMaterialTxns::ToCustomerId)
                .to(Customers::Table, Customers::Id)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .to_owned()
}

fn supplier_payments_table() -> TableCreateStatement {
    Table::create()
        .table(SupplierPayments::Table)
        .if_not_exists()
        .col(ColumnDef::new(SupplierPayments::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(SupplierPayments::SupplierName).string_len(200).not_null())
        .col(ColumnDef::new(SupplierPayments::PaidOn).date().not_null())
        .col(ColumnDef::new(SupplierPayments::Method).string_len(16).not_null())
        .col(ColumnDef::new(SupplierPayments::Bank).string_len(100).not_null().default(""))
        .col(ColumnDef::new(SupplierPayments::Reference).string_len(100).not_null().default(""))
        .col(ColumnDef::new(SupplierPayments::Amount).big_integer().not_null())
        .col(ColumnDef::new(SupplierPayments::Notes).text().not_null().default(""))
        .col(ColumnDef::new(SupplierPayments::CreatedAt).timestamp_with_time_zone().not_null())
        .check(Expr::col(SupplierPayments::Amount).gte(0))
        .to_owned()
}

fn purchase_payment_links_table() -> TableCreateStatement {
    Table::create()
        .table(PurchasePaymentLinks::Table)
        .if_not_exists()
        .col(ColumnDef::new(PurchasePaymentLinks::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(PurchasePaymentLinks::PurchaseId).uuid().not_null())
        .col(ColumnDef::new(PurchasePaymentLinks::PaymentId).uuid().not_null())
        .col(ColumnDef::new(PurchasePaymentLinks::CreatedAt).timestamp_with_time_zone().not_null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_purchase_payment_links_purchase")
                .from(PurchasePaymentLinks::Table, PurchasePaymentLinks::PurchaseId)
                .to(RawMaterialTxns::Table, RawMaterialTxns::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_purchase_payment_links_payment")
                .from(PurchasePaymentLinks::Table, PurchasePaymentLinks::PaymentId)
                .to(SupplierPayments::Table, SupplierPayments::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn material_ledger_entries_table() -> TableCreateStatement {
    Table::create()
        .table(MaterialLedgerEntries::Table)
        .if_not_exists()
        .col(ColumnDef::new(MaterialLedgerEntries::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(MaterialLedgerEntries::PartyKind).string_len(16).not_null())
        .col(ColumnDef::new(MaterialLedgerEntries::CustomerId).uuid().null())
        .col(ColumnDef::new(MaterialLedgerEntries::EntryType).string_len(8).not_null())
        .col(ColumnDef::new(MaterialLedgerEntries::DeltaGrams).big_integer().not_null())
        .col(ColumnDef::new(MaterialLedgerEntries::EntryDate).date().not_null())
        .col(ColumnDef::new(MaterialLedgerEntries::MaterialType).string_len(8).null())
        .col(ColumnDef::new(MaterialLedgerEntries::Memo).text().not_null().default(""))
        .col(ColumnDef::new(MaterialLedgerEntries::OrderId).uuid().null())
        .col(ColumnDef::new(MaterialLedgerEntries::ReceiptId).uuid().null())
        .col(ColumnDef::new(MaterialLedgerEntries::RawTxnId).uuid().null())
        .col(ColumnDef::new(MaterialLedgerEntries::CreatedAt).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(MaterialLedgerEntries::UpdatedAt).timestamp_with_time_zone().not_null())
        .check(Expr::col(MaterialLedgerEntries::DeltaGrams).ne(0))
        .check(
            Expr::col(MaterialLedgerEntries::PartyKind)
                .eq("COMPANY_STOCK")
                .and(Expr::col(MaterialLedgerEntries::CustomerId).is_null())
                .or(Expr::col(MaterialLedgerEntries::PartyKind)
                    .eq("CUSTOMER")
                    .and(Expr::col(MaterialLedgerEntries::CustomerId).is_not_null())),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_material_ledger_customer")
                .from(MaterialLedgerEntries::Table, MaterialLedgerEntries::CustomerId)
                .to(Customers::Table, Customers::Id)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_material_ledger_order")
                .from(MaterialLedgerEntries::Table, MaterialLedgerEntries::OrderId)
                .to(Orders::Table, Orders::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_material_ledger_receipt")
                .from(MaterialLedgerEntries::Table, MaterialLedgerEntries::ReceiptId)
                .to(MaterialReceipts::Table, MaterialReceipts::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_material_ledger_raw_txn")
                .from(MaterialLedgerEntries::Table, MaterialLedgerEntries::RawTxnId)
                .to(RawMaterialTxns::Table, RawMaterialTxns::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

// ============================================================
// INDEXES
// ============================================================

fn indexes() -> Vec<IndexCreateStatement> {
    vec![
        // One consumption row per order and direction
        Index::create()
            .name("uq_material_ledger_order_entry_type")
            .table(MaterialLedgerEntries::Table)
            .col(MaterialLedgerEntries::OrderId)
            .col(MaterialLedgerEntries::EntryType)
            .unique()
            .to_owned(),
        // One row per receipt, whatever its direction
        Index::create()
            .name("uq_material_ledger_receipt")
            .table(MaterialLedgerEntries::Table)
            .col(MaterialLedgerEntries::ReceiptId)
            .unique()
            .to_owned(),
        Index::create()
            .name("uq_material_ledger_raw_txn_entry_type")
            .table(MaterialLedgerEntries::Table)
            .col(MaterialLedgerEntries::RawTxnId)
            .col(MaterialLedgerEntries::EntryType)
            .unique()
            .to_owned(),
        Index::create()
            .name("idx_material_ledger_customer_date")
            .table(MaterialLedgerEntries::Table)
            .col(MaterialLedgerEntries::CustomerId)
            .col(MaterialLedgerEntries::EntryDate)
            .to_owned(),
        Index::create()
            .name("uq_payment_allocations_pair")
            .table(PaymentAllocations::Table)
            .col(PaymentAllocations::PaymentId)
            .col(PaymentAllocations::OrderId)
            .unique()
            .to_owned(),
        Index::create()
            .name("idx_payment_allocations_order")
            .table(PaymentAllocations::Table)
            .col(PaymentAllocations::OrderId)
            .to_owned(),
        Index::create()
            .name("uq_purchase_payment_links_pair")
            .table(PurchasePaymentLinks::Table)
            .col(PurchasePaymentLinks::PurchaseId)
            .col(PurchasePaymentLinks::PaymentId)
            .unique()
            .to_owned(),
        Index::create()
            .name("idx_orders_customer_date")
            .table(Orders::Table)
            .col(Orders::CustomerId)
            .col(Orders::OrderDate)
            .to_owned(),
        Index::create()
            .name("idx_payments_customer_date")
            .table(Payments::Table)
            .col(Payments::CustomerId)
            .col(Payments::ReceivedOn)
            .to_owned(),
        Index::create()
            .name("idx_order_rolls_order")
            .table(OrderRolls::Table)
            .col(OrderRolls::OrderId)
            .to_owned(),
    ]
}

// ============================================================
// IDENTIFIERS
// ============================================================

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    CompanyName,
    ContactName,
    Phone,
    PreviousPendingBalance,
    PendingBalance,
    ShortfallEnabled,
    ShortfallRateHundredths,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    CustomerId,
    InvoiceNumber,
    OrderDate,
    Status,
    TargetTotalGrams,
    ProducedGrams,
    PricePerKgHundredths,
    IncludeTax,
    ToleranceGrams,
    MaterialType,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderRolls {
    Table,
    Id,
    OrderId,
    WeightGrams,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    CustomerId,
    ReceivedOn,
    Amount,
    Method,
    Reference,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PaymentAllocations {
    Table,
    Id,
    PaymentId,
    OrderId,
    Amount,
    RoundingAdjustment,
    AppliedOn,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MaterialReceipts {
    Table,
    Id,
    CustomerId,
    ReceivedOn,
    MaterialType,
    BagsCount,
    ExtraGrams,
    Notes,
    IsOpeningAdjustment,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RawMaterialTxns {
    Table,
    Id,
    Kind,
    TxnDate,
    SupplierName,
    FromPartyKind,
    FromCustomerId,
    ToPartyKind,
    ToCustomerId,
    QtyGrams,
    BagsCount,
    RateHundredths,
    Amount,
    MaterialType,
    DcNumber,
    Memo,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SupplierPayments {
    Table,
    Id,
    SupplierName,
    PaidOn,
    Method,
    Bank,
    Reference,
    Amount,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PurchasePaymentLinks {
    Table,
    Id,
    PurchaseId,
    PaymentId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MaterialLedgerEntries {
    Table,
    Id,
    PartyKind,
    CustomerId,
    EntryType,
    DeltaGrams,
    EntryDate,
    MaterialType,
    Memo,
    OrderId,
    ReceiptId,
    RawTxnId,
    CreatedAt,
    UpdatedAt,
}
