//! Material receipt repository.

use chrono::{NaiveDate, Utc};
use polyroll_core::material::{MaterialKind, MaterialReceipt, receipt_sync};
use polyroll_shared::BillingSettings;
use polyroll_shared::types::{CustomerId, ReceiptId, grams_from_kg, to_weight_kg};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::customer::{find_customer, refresh_pending_balance_in};
use super::error::RepositoryError;
use super::mapping::{bags_to_column, receipt_from_model};
use super::material_ledger::{apply_sync, delete_by_receipt};
use crate::entities::material_receipts;

/// Fields of a receipt as entered.
#[derive(Debug, Clone)]
pub struct ReceiptInput {
    /// Customer who sent the material.
    pub customer_id: CustomerId,
    /// Date the material arrived.
    pub received_on: NaiveDate,
    /// Optional category tag.
    pub material_type: Option<MaterialKind>,
    /// Whole bags.
    pub bags_count: u32,
    /// Loose kg.
    pub extra_kg: Decimal,
    /// Notes, copied to the ledger memo.
    pub notes: String,
    /// Opening balance or correction.
    pub is_opening_adjustment: bool,
}

impl ReceiptInput {
    fn into_receipt(self, id: ReceiptId) -> MaterialReceipt {
        MaterialReceipt {
            id,
            customer_id: self.customer_id,
            received_on: self.received_on,
            material_type: self.material_type,
            bags_count: self.bags_count,
            extra_kg: to_weight_kg(self.extra_kg),
            notes: self.notes.trim().to_string(),
            is_opening_adjustment: self.is_opening_adjustment,
        }
    }
}

/// Material receipt repository.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    db: DatabaseConnection,
    settings: BillingSettings,
}

impl ReceiptRepository {
    /// Creates a new receipt repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: BillingSettings) -> Self {
        Self { db, settings }
    }

    /// Records a receipt and its ledger row.
    ///
    /// # Errors
    ///
    /// Returns `MaterialError::ReceiptNotPositive` or `MaterialError::ZeroAdjustment`
    /// for an invalid total.
    pub async fn create(&self, input: ReceiptInput) -> Result<MaterialReceipt, RepositoryError> {
        let receipt = input.into_receipt(ReceiptId::new());
        let total_kg = receipt.validate(self.bag_weight())?;

        let txn = self.db.begin().await?;
        find_customer(&txn, receipt.customer_id).await?;
        material_receipts::ActiveModel {
            id: Set(receipt.id.into_inner()),
            customer_id: Set(receipt.customer_id.into_inner()),
            received_on: Set(receipt.received_on),
            material_type: Set(receipt.material_type.map(Into::into)),
            bags_count: Set(bags_to_column(receipt.bags_count)?),
            extra_grams: Set(grams_from_kg(receipt.extra_kg)),
            notes: Set(receipt.notes.clone()),
            is_opening_adjustment: Set(receipt.is_opening_adjustment),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        self.sync(&txn, &receipt).await?;
        txn.commit().await?;

        tracing::info!(receipt_id = %receipt.id, customer_id = %receipt.customer_id, %total_kg, "receipt recorded");
        Ok(receipt)
    }

    /// Replaces a receipt's fields and its ledger row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the receipt does not exist.
    pub async fn update(&self, receipt_id: ReceiptId, input: ReceiptInput) -> Result<MaterialReceipt, RepositoryError> {
        let receipt = input.into_receipt(receipt_id);
        receipt.validate(self.bag_weight())?;

        let txn = self.db.begin().await?;
        let existing = find_receipt(&txn, receipt_id).await?;
        let previous_customer = CustomerId::from_uuid(existing.customer_id);
        find_customer(&txn, receipt.customer_id).await?;

        let mut active: material_receipts::ActiveModel = existing.into();
        active.customer_id = Set(receipt.customer_id.into_inner());
        active.received_on = Set(receipt.received_on);
        active.material_type = Set(receipt.material_type.map(Into::into));
        active.bags_count = Set(bags_to_column(receipt.bags_count)?);
        active.extra_grams = Set(grams_from_kg(receipt.extra_kg));
        active.notes = Set(receipt.notes.clone());
        active.is_opening_adjustment = Set(receipt.is_opening_adjustment);
        active.update(&txn).await?;

        self.sync(&txn, &receipt).await?;
        if previous_customer != receipt.customer_id {
            refresh_pending_balance_in(&txn, previous_customer, &self.settings).await?;
        }
        txn.commit().await?;

        tracing::info!(receipt_id = %receipt_id, "receipt updated");
        Ok(receipt)
    }

    /// Deletes a receipt and its ledger row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the receipt does not exist.
    pub async fn delete(&self, receipt_id: ReceiptId) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = find_receipt(&txn, receipt_id).await?;

        delete_by_receipt(&txn, receipt_id).await?;
        material_receipts::Entity::delete_by_id(existing.id).exec(&txn).await?;
        refresh_pending_balance_in(&txn, CustomerId::from_uuid(existing.customer_id), &self.settings).await?;
        txn.commit().await?;

        tracing::info!(receipt_id = %receipt_id, "receipt deleted");
        Ok(())
    }

    /// Finds a receipt by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the receipt does not exist.
    pub async fn find_by_id(&self, receipt_id: ReceiptId) -> Result<MaterialReceipt, RepositoryError> {
        Ok(receipt_from_model(&find_receipt(&self.db, receipt_id).await?))
    }

    /// Receipts of a customer, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_customer(&self, customer_id: CustomerId) -> Result<Vec<MaterialReceipt>, RepositoryError> {
        let rows = material_receipts::Entity::find()
            .filter(material_receipts::Column::CustomerId.eq(customer_id.into_inner()))
            .order_by_asc(material_receipts::Column::ReceivedOn)
            .order_by_asc(material_receipts::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.iter().map(receipt_from_model).collect())
    }

    fn bag_weight(&self) -> Decimal {
        self.settings.raw_material.bag_weight_kg
    }

    async fn sync<C: ConnectionTrait>(&self, conn: &C, receipt: &MaterialReceipt) -> Result<(), RepositoryError> {
        apply_sync(conn, &receipt_sync(receipt, self.bag_weight())?).await?;
        refresh_pending_balance_in(conn, receipt.customer_id, &self.settings).await?;
        Ok(())
    }
}

async fn find_receipt<C: ConnectionTrait>(
    conn: &C,
    receipt_id: ReceiptId,
) -> Result<material_receipts::Model, RepositoryError> {
    material_receipts::Entity::find_by_id(receipt_id.into_inner())
        .one(conn)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity: "receipt",
            id: receipt_id.into_inner(),
        })
}
