//! Supplier payment repository (accounts payable).

use chrono::Utc;
use polyroll_core::payables::{PurchaseSettlement, SupplierPayment, validate_link};
use polyroll_core::raw_material::TxnKind;
use polyroll_shared::types::{RawMaterialTxnId, SupplierPaymentId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::error::RepositoryError;
use super::mapping::supplier_payment_from_model;
use super::raw_material::find_txn;
use crate::entities::{purchase_payment_links, supplier_payments};

/// Supplier payment repository.
#[derive(Debug, Clone)]
pub struct PayablesRepository {
    db: DatabaseConnection,
}

impl PayablesRepository {
    /// Creates a new payables repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an outgoing supplier payment.
    ///
    /// # Errors
    ///
    /// Returns `PayablesError` for a blank supplier or a negative amount.
    pub async fn record_payment(&self, mut payment: SupplierPayment) -> Result<SupplierPayment, RepositoryError> {
        payment.validate()?;
        supplier_payments::ActiveModel {
            id: Set(payment.id.into_inner()),
            supplier_name: Set(payment.supplier_name.clone()),
            paid_on: Set(payment.paid_on),
            method: Set(payment.method.into()),
            bank: Set(payment.bank.trim().to_string()),
            reference: Set(payment.reference.trim().to_string()),
            amount: Set(payment.amount),
            notes: Set(payment.notes.trim().to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| RepositoryError::from_write("supplier_payments", e))?;

        tracing::info!(
            supplier_payment_id = %payment.id,
            supplier = %payment.supplier_name,
            amount = payment.amount,
            "supplier payment recorded"
        );
        Ok(payment)
    }

    /// Replaces a supplier payment's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    pub async fn update_payment(&self, mut payment: SupplierPayment) -> Result<SupplierPayment, RepositoryError> {
        payment.validate()?;
        let existing = find_supplier_payment(&self.db, payment.id).await?;
        let mut active: supplier_payments::ActiveModel = existing.into();
        active.supplier_name = Set(payment.supplier_name.clone());
        active.paid_on = Set(payment.paid_on);
        active.method = Set(payment.method.into());
        active.bank = Set(payment.bank.trim().to_string());
        active.reference = Set(payment.reference.trim().to_string());
        active.amount = Set(payment.amount);
        active.notes = Set(payment.notes.trim().to_string());
        let model = active.update(&self.db).await?;
        Ok(supplier_payment_from_model(&model))
    }

    /// Deletes a supplier payment and its purchase links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    pub async fn delete_payment(&self, payment_id: SupplierPaymentId) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = find_supplier_payment(&txn, payment_id).await?;
        purchase_payment_links::Entity::delete_many()
            .filter(purchase_payment_links::Column::PaymentId.eq(existing.id))
            .exec(&txn)
            .await?;
        supplier_payments::Entity::delete_by_id(existing.id).exec(&txn).await?;
        txn.commit().await?;
        tracing::info!(supplier_payment_id = %payment_id, "supplier payment deleted");
        Ok(())
    }

    /// Links a supplier payment to a purchase.
    ///
    /// # Errors
    ///
    /// Returns `PayablesError::NotAPurchase` for a sale or transfer, or
    /// `RepositoryError::Integrity` if the pair is already linked.
    pub async fn link(&self, purchase_id: RawMaterialTxnId, payment_id: SupplierPaymentId) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        let purchase = find_txn(&txn, purchase_id).await?;
        validate_link(TxnKind::from(purchase.kind))?;
        find_supplier_payment(&txn, payment_id).await?;

        purchase_payment_links::ActiveModel {
            id: Set(Uuid::now_v7()),
            purchase_id: Set(purchase_id.into_inner()),
            payment_id: Set(payment_id.into_inner()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| RepositoryError::from_write("purchase_payment_links", e))?;
        txn.commit().await?;

        tracing::info!(purchase_id = %purchase_id, supplier_payment_id = %payment_id, "supplier payment linked");
        Ok(())
    }

    /// Removes the link between a purchase and a supplier payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn unlink(&self, purchase_id: RawMaterialTxnId, payment_id: SupplierPaymentId) -> Result<u64, RepositoryError> {
        let result = purchase_payment_links::Entity::delete_many()
            .filter(purchase_payment_links::Column::PurchaseId.eq(purchase_id.into_inner()))
            .filter(purchase_payment_links::Column::PaymentId.eq(payment_id.into_inner()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Paid and outstanding amounts of a transaction; zero unless it is a purchase.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the transaction does not exist.
    pub async fn settlement(&self, purchase_id: RawMaterialTxnId) -> Result<PurchaseSettlement, RepositoryError> {
        let purchase = find_txn(&self.db, purchase_id).await?;
        let linked = self.payments_for_purchase(purchase_id).await?;
        Ok(PurchaseSettlement::for_txn(
            purchase.kind.into(),
            purchase.amount,
            linked.iter().map(|p| p.amount),
        ))
    }

    /// Supplier payments linked to a purchase.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn payments_for_purchase(&self, purchase_id: RawMaterialTxnId) -> Result<Vec<SupplierPayment>, RepositoryError> {
        let payment_ids: Vec<Uuid> = purchase_payment_links::Entity::find()
            .filter(purchase_payment_links::Column::PurchaseId.eq(purchase_id.into_inner()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|link| link.payment_id)
            .collect();
        if payment_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = supplier_payments::Entity::find()
            .filter(supplier_payments::Column::Id.is_in(payment_ids))
            .order_by_asc(supplier_payments::Column::PaidOn)
            .all(&self.db)
            .await?;
        Ok(rows.iter().map(supplier_payment_from_model).collect())
    }
}

async fn find_supplier_payment<C: ConnectionTrait>(
    conn: &C,
    payment_id: SupplierPaymentId,
) -> Result<supplier_payments::Model, RepositoryError> {
    supplier_payments::Entity::find_by_id(payment_id.into_inner())
        .one(conn)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity: "supplier payment",
            id: payment_id.into_inner(),
        })
}
