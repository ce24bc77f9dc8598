//! Material ledger repository.
//!
//! The repository only reads. Rows are derived from orders, receipts and
//! raw-material transactions and written by those repositories, keyed so
//! re-running a sync replaces the row instead of adding a second one. The
//! owner's cached pending balance is refreshed in the same transaction.

use chrono::{NaiveDate, Utc};
use polyroll_core::material::{
    LedgerKey, LedgerPosting, LedgerSource, MaterialLedgerEntry, Party, PeriodMovement, SyncAction,
    balance_as_of, period_movement,
};
use polyroll_shared::types::{LedgerEntryId, OrderId, ReceiptId, grams_from_kg, kg_from_grams};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::error::RepositoryError;
use super::mapping::{ledger_entry_from_model, party_columns};
use crate::entities::material_ledger_entries::{self, Column};
use crate::entities::sea_orm_active_enums::EntryType;

const ENTITY: &str = "material_ledger_entries";

/// Material ledger repository.
#[derive(Debug, Clone)]
pub struct MaterialLedgerRepository {
    db: DatabaseConnection,
}

impl MaterialLedgerRepository {
    /// Creates a new material ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Σ delta of the party's rows dated on or before `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn balance_as_of(&self, party: Party, cutoff: NaiveDate) -> Result<Decimal, RepositoryError> {
        party_balance_as_of(&self.db, party, cutoff).await
    }

    /// Inflow and outflow of the party within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `MaterialError::InvalidPeriod` if `start > end`, or a database error.
    pub async fn period_movement(
        &self,
        party: Party,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PeriodMovement, RepositoryError> {
        let entries = entries_for_party(&self.db, party, Some(end)).await?;
        Ok(period_movement(&entries, party, start, end)?)
    }

    /// All rows of the party, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_party(&self, party: Party) -> Result<Vec<MaterialLedgerEntry>, RepositoryError> {
        entries_for_party(&self.db, party, None).await
    }
}

// ============================================================================
// Connection-generic helpers shared with the other repositories
// ============================================================================

fn party_condition(party: Party) -> Condition {
    match party_columns(party) {
        (kind, Some(customer_id)) => Condition::all()
            .add(Column::PartyKind.eq(kind))
            .add(Column::CustomerId.eq(customer_id)),
        (kind, None) => Condition::all().add(Column::PartyKind.eq(kind)),
    }
}

fn key_condition(key: &LedgerKey) -> Condition {
    let entry_type = EntryType::from(key.entry_type);
    match key.source {
        LedgerSource::Order(id) => Condition::all()
            .add(Column::OrderId.eq(id.into_inner()))
            .add(Column::EntryType.eq(entry_type)),
        LedgerSource::Receipt(id) => Condition::all().add(Column::ReceiptId.eq(id.into_inner())),
        LedgerSource::RawTxn(id) => Condition::all()
            .add(Column::RawTxnId.eq(id.into_inner()))
            .add(Column::EntryType.eq(entry_type)),
    }
}

fn source_condition(source: LedgerSource) -> Condition {
    match source {
        LedgerSource::Order(id) => Condition::all().add(Column::OrderId.eq(id.into_inner())),
        LedgerSource::Receipt(id) => Condition::all().add(Column::ReceiptId.eq(id.into_inner())),
        LedgerSource::RawTxn(id) => Condition::all().add(Column::RawTxnId.eq(id.into_inner())),
    }
}

/// Upserts a posting by its key.
pub(crate) async fn upsert_posting<C: ConnectionTrait>(
    conn: &C,
    posting: &LedgerPosting,
) -> Result<MaterialLedgerEntry, RepositoryError> {
    let now = Utc::now().into();
    let (party_kind, customer_id) = party_columns(posting.party);

    let existing = material_ledger_entries::Entity::find()
        .filter(key_condition(&posting.key))
        .one(conn)
        .await?;

    let model = match existing {
        Some(row) => {
            let mut active: material_ledger_entries::ActiveModel = row.into();
            active.party_kind = Set(party_kind);
            active.customer_id = Set(customer_id);
            active.entry_type = Set(posting.key.entry_type.into());
            active.delta_grams = Set(grams_from_kg(posting.delta_kg));
            active.entry_date = Set(posting.date);
            active.material_type = Set(posting.material_type.map(Into::into));
            active.memo = Set(posting.memo.clone());
            active.updated_at = Set(now);
            active.update(conn).await?
        }
        None => {
            let (order_id, receipt_id, raw_txn_id) = match posting.key.source {
                LedgerSource::Order(id) => (Some(id.into_inner()), None, None),
                LedgerSource::Receipt(id) => (None, Some(id.into_inner()), None),
                LedgerSource::RawTxn(id) => (None, None, Some(id.into_inner())),
            };
            material_ledger_entries::ActiveModel {
                id: Set(LedgerEntryId::new().into_inner()),
                party_kind: Set(party_kind),
                customer_id: Set(customer_id),
                entry_type: Set(posting.key.entry_type.into()),
                delta_grams: Set(grams_from_kg(posting.delta_kg)),
                entry_date: Set(posting.date),
                material_type: Set(posting.material_type.map(Into::into)),
                memo: Set(posting.memo.clone()),
                order_id: Set(order_id),
                receipt_id: Set(receipt_id),
                raw_txn_id: Set(raw_txn_id),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(conn)
            .await
            .map_err(|e| RepositoryError::from_write(ENTITY, e))?
        }
    };

    tracing::info!(
        party = %posting.party,
        entry_type = %posting.key.entry_type,
        delta_kg = %posting.delta_kg,
        date = %posting.date,
        "material ledger row upserted"
    );
    ledger_entry_from_model(&model)
}

/// Deletes the row carrying `key`, if any.
pub(crate) async fn remove_key<C: ConnectionTrait>(conn: &C, key: &LedgerKey) -> Result<u64, RepositoryError> {
    let result = material_ledger_entries::Entity::delete_many()
        .filter(key_condition(key))
        .exec(conn)
        .await?;
    if result.rows_affected > 0 {
        tracing::info!(source = ?key.source, entry_type = %key.entry_type, "material ledger row removed");
    }
    Ok(result.rows_affected)
}

/// Applies a sync decision.
pub(crate) async fn apply_sync<C: ConnectionTrait>(conn: &C, action: &SyncAction) -> Result<(), RepositoryError> {
    match action {
        SyncAction::Upsert(posting) => {
            upsert_posting(conn, posting).await?;
        }
        SyncAction::Remove(key) => {
            remove_key(conn, key).await?;
        }
    }
    Ok(())
}

/// Deletes every row derived from `source`.
pub(crate) async fn delete_by_source<C: ConnectionTrait>(conn: &C, source: LedgerSource) -> Result<u64, RepositoryError> {
    let result = material_ledger_entries::Entity::delete_many()
        .filter(source_condition(source))
        .exec(conn)
        .await?;
    tracing::info!(source = ?source, rows = result.rows_affected, "material ledger rows deleted");
    Ok(result.rows_affected)
}

/// Deletes the consumption rows of an order.
pub(crate) async fn delete_by_order<C: ConnectionTrait>(conn: &C, order_id: OrderId) -> Result<u64, RepositoryError> {
    delete_by_source(conn, LedgerSource::Order(order_id)).await
}

/// Deletes the row of a receipt.
pub(crate) async fn delete_by_receipt<C: ConnectionTrait>(conn: &C, receipt_id: ReceiptId) -> Result<u64, RepositoryError> {
    delete_by_source(conn, LedgerSource::Receipt(receipt_id)).await
}

/// Deletes the rows of a raw-material transaction whose entry type the
/// transaction no longer produces.
pub(crate) async fn retain_raw_txn_rows<C: ConnectionTrait>(
    conn: &C,
    source: LedgerSource,
    keep: &[polyroll_core::material::EntryType],
) -> Result<u64, RepositoryError> {
    let keep: Vec<EntryType> = keep.iter().copied().map(EntryType::from).collect();
    let result = material_ledger_entries::Entity::delete_many()
        .filter(source_condition(source))
        .filter(Column::EntryType.is_not_in(keep))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// The party's rows, optionally only those dated on or before `up_to`.
pub(crate) async fn entries_for_party<C: ConnectionTrait>(
    conn: &C,
    party: Party,
    up_to: Option<NaiveDate>,
) -> Result<Vec<MaterialLedgerEntry>, RepositoryError> {
    let mut query = material_ledger_entries::Entity::find().filter(party_condition(party));
    if let Some(up_to) = up_to {
        query = query.filter(Column::EntryDate.lte(up_to));
    }
    query
        .order_by_asc(Column::EntryDate)
        .order_by_asc(Column::Id)
        .all(conn)
        .await?
        .iter()
        .map(ledger_entry_from_model)
        .collect()
}

/// Σ delta of the party's rows dated on or before `cutoff`.
pub(crate) async fn party_balance_as_of<C: ConnectionTrait>(
    conn: &C,
    party: Party,
    cutoff: NaiveDate,
) -> Result<Decimal, RepositoryError> {
    let entries = entries_for_party(conn, party, Some(cutoff)).await?;
    Ok(balance_as_of(&entries, party, cutoff))
}

/// The existing consumption delta of an order, if it has one.
pub(crate) async fn order_consumption_delta<C: ConnectionTrait>(
    conn: &C,
    order_id: OrderId,
) -> Result<Option<Decimal>, RepositoryError> {
    let row = material_ledger_entries::Entity::find()
        .filter(key_condition(&LedgerKey::order_consumption(order_id)))
        .one(conn)
        .await?;
    Ok(row.map(|r| kg_from_grams(r.delta_grams)))
}

