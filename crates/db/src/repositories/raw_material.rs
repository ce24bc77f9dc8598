//! Raw-material transaction repository.
//!
//! A transaction row and the ledger rows it owns are written in one database
//! transaction; re-applying an edited transaction replaces the rows by key.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use polyroll_core::material::{LedgerSource, Party};
use polyroll_core::raw_material::{
    COMPANY_STOCK_NAME, NormalizedTxn, RawMaterialService, RawMaterialTxn, RawMaterialTxnInput,
};
use polyroll_shared::BillingSettings;
use polyroll_shared::types::{CustomerId, RawMaterialTxnId, grams_from_kg, rate_to_hundredths};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::customer::{find_customer, refresh_pending_balance_in};
use super::error::RepositoryError;
use super::mapping::{bags_to_column, party_columns, raw_txn_from_model};
use super::material_ledger::{delete_by_source, retain_raw_txn_rows, upsert_posting};
use crate::entities::sea_orm_active_enums::PartyKind;
use crate::entities::{customers, purchase_payment_links, raw_material_txns};

/// Raw-material transaction repository.
#[derive(Debug, Clone)]
pub struct RawMaterialRepository {
    db: DatabaseConnection,
    settings: BillingSettings,
}

impl RawMaterialRepository {
    /// Creates a new raw-material repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: BillingSettings) -> Self {
        Self { db, settings }
    }

    /// Validates a transaction, stores it and writes its ledger rows.
    ///
    /// # Errors
    ///
    /// Returns the `RawMaterialError` of an invalid input before anything is
    /// written, or `RepositoryError::NotFound` for an unknown customer.
    pub async fn apply(&self, input: &RawMaterialTxnInput) -> Result<RawMaterialTxn, RepositoryError> {
        let normalized = RawMaterialService::normalize(input, &self.settings.raw_material)?;
        let id = RawMaterialTxnId::new();

        let txn = self.db.begin().await?;
        let (from_kind, from_customer) = split_optional(normalized.from);
        let (to_kind, to_customer) = party_columns(normalized.to);
        let now = Utc::now().into();
        raw_material_txns::ActiveModel {
            id: Set(id.into_inner()),
            kind: Set(normalized.kind.into()),
            txn_date: Set(normalized.txn_date),
            supplier_name: Set(normalized.supplier_name.clone()),
            from_party_kind: Set(from_kind),
            from_customer_id: Set(from_customer),
            to_party_kind: Set(to_kind),
            to_customer_id: Set(to_customer),
            qty_grams: Set(grams_from_kg(normalized.qty_kg)),
            bags_count: Set(bags_to_column(normalized.bags_count)?),
            rate_hundredths: Set(rate_to_hundredths(normalized.rate)),
            amount: Set(normalized.amount),
            material_type: Set(normalized.material_type.into()),
            dc_number: Set(normalized.dc_number.clone()),
            memo: Set(normalized.memo.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| RepositoryError::from_write("raw_material_txns", e))?;

        write_postings(&txn, id, &normalized).await?;
        refresh_customers(&txn, &self.settings, affected_customers([&normalized])).await?;
        txn.commit().await?;

        tracing::info!(
            raw_txn_id = %id,
            kind = %normalized.kind,
            qty_kg = %normalized.qty_kg,
            amount = normalized.amount,
            "raw-material transaction applied"
        );
        Ok(RawMaterialTxn { id, txn: normalized })
    }

    /// Replaces an existing transaction and its ledger rows. Rows whose key the
    /// new kind no longer produces are deleted.
    ///
    /// # Errors
    ///
    /// Returns the `RawMaterialError` of an invalid input, or
    /// `RepositoryError::NotFound` if the transaction does not exist.
    pub async fn reapply(
        &self,
        id: RawMaterialTxnId,
        input: &RawMaterialTxnInput,
    ) -> Result<RawMaterialTxn, RepositoryError> {
        let normalized = RawMaterialService::normalize(input, &self.settings.raw_material)?;

        let txn = self.db.begin().await?;
        let existing = find_txn(&txn, id).await?;
        let previous = raw_txn_from_model(&existing)?;

        let (from_kind, from_customer) = split_optional(normalized.from);
        let (to_kind, to_customer) = party_columns(normalized.to);
        let mut active: raw_material_txns::ActiveModel = existing.into();
        active.kind = Set(normalized.kind.into());
        active.txn_date = Set(normalized.txn_date);
        active.supplier_name = Set(normalized.supplier_name.clone());
        active.from_party_kind = Set(from_kind);
        active.from_customer_id = Set(from_customer);
        active.to_party_kind = Set(to_kind);
        active.to_customer_id = Set(to_customer);
        active.qty_grams = Set(grams_from_kg(normalized.qty_kg));
        active.bags_count = Set(bags_to_column(normalized.bags_count)?);
        active.rate_hundredths = Set(rate_to_hundredths(normalized.rate));
        active.amount = Set(normalized.amount);
        active.material_type = Set(normalized.material_type.into());
        active.dc_number = Set(normalized.dc_number.clone());
        active.memo = Set(normalized.memo.clone());
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        write_postings(&txn, id, &normalized).await?;
        let removed = retain_raw_txn_rows(&txn, LedgerSource::RawTxn(id), normalized.kind.entry_types()).await?;
        refresh_customers(&txn, &self.settings, affected_customers([&previous.txn, &normalized])).await?;
        txn.commit().await?;

        tracing::info!(
            raw_txn_id = %id,
            from_kind = %previous.txn.kind,
            to_kind = %normalized.kind,
            stale_rows_removed = removed,
            "raw-material transaction reapplied"
        );
        Ok(RawMaterialTxn { id, txn: normalized })
    }

    /// Deletes a transaction, its ledger rows and its supplier-payment links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the transaction does not exist.
    pub async fn delete(&self, id: RawMaterialTxnId) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = find_txn(&txn, id).await?;
        let previous = raw_txn_from_model(&existing)?;

        delete_by_source(&txn, LedgerSource::RawTxn(id)).await?;
        purchase_payment_links::Entity::delete_many()
            .filter(purchase_payment_links::Column::PurchaseId.eq(existing.id))
            .exec(&txn)
            .await?;
        raw_material_txns::Entity::delete_by_id(existing.id).exec(&txn).await?;
        refresh_customers(&txn, &self.settings, affected_customers([&previous.txn])).await?;
        txn.commit().await?;

        tracing::info!(raw_txn_id = %id, kind = %previous.txn.kind, "raw-material transaction deleted");
        Ok(())
    }

    /// Finds a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the transaction does not exist.
    pub async fn find_by_id(&self, id: RawMaterialTxnId) -> Result<RawMaterialTxn, RepositoryError> {
        raw_txn_from_model(&find_txn(&self.db, id).await?)
    }

    /// All transactions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<RawMaterialTxn>, RepositoryError> {
        raw_material_txns::Entity::find()
            .order_by_asc(raw_material_txns::Column::TxnDate)
            .order_by_asc(raw_material_txns::Column::Id)
            .all(&self.db)
            .await?
            .iter()
            .map(raw_txn_from_model)
            .collect()
    }
}

pub(crate) async fn find_txn<C: ConnectionTrait>(
    conn: &C,
    id: RawMaterialTxnId,
) -> Result<raw_material_txns::Model, RepositoryError> {
    raw_material_txns::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity: "raw-material transaction",
            id: id.into_inner(),
        })
}

fn split_optional(party: Option<Party>) -> (Option<PartyKind>, Option<Uuid>) {
    match party.map(party_columns) {
        Some((kind, customer_id)) => (Some(kind), customer_id),
        None => (None, None),
    }
}

fn affected_customers<'a>(txns: impl IntoIterator<Item = &'a NormalizedTxn>) -> BTreeSet<CustomerId> {
    txns.into_iter()
        .flat_map(|t| [t.from, Some(t.to)])
        .flatten()
        .filter_map(Party::customer_id)
        .collect()
}

/// Upserts every posting of the transaction, naming customers in memos.
async fn write_postings<C: ConnectionTrait>(
    conn: &C,
    id: RawMaterialTxnId,
    normalized: &NormalizedTxn,
) -> Result<(), RepositoryError> {
    let mut names = HashMap::new();
    for customer_id in affected_customers([normalized]) {
        let customer: customers::Model = find_customer(conn, customer_id).await?;
        names.insert(customer_id, customer.company_name);
    }
    let party_name = |party: Party| match party {
        Party::CompanyStock => COMPANY_STOCK_NAME.to_string(),
        Party::Customer(id) => names.get(&id).cloned().unwrap_or_else(|| id.to_string()),
    };

    for posting in normalized.postings(id, party_name)? {
        upsert_posting(conn, &posting).await?;
    }
    Ok(())
}

async fn refresh_customers<C: ConnectionTrait>(
    conn: &C,
    settings: &BillingSettings,
    customer_ids: BTreeSet<CustomerId>,
) -> Result<(), RepositoryError> {
    for customer_id in customer_ids {
        refresh_pending_balance_in(conn, customer_id, settings).await?;
    }
    Ok(())
}
