//! Receivables repository: payments, allocations and FIFO auto-allocation.
//!
//! Every allocation write re-reads the payment's and the order's other rows
//! inside the same transaction and validates both bounds before upserting the
//! (payment, order) row.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use polyroll_core::orders::{Order, OrderTotals};
use polyroll_core::receivables::{
    AllocationBounds, AllocationError, AllocationRequest, OpenInvoice, Payment, PaymentAllocation,
    PaymentMethod, ReleaseStep, plan_fifo, plan_release, unapplied_amount, validate_allocation,
    validate_payment_amount,
};
use polyroll_shared::BillingSettings;
use polyroll_shared::types::{AllocationId, Amount, CustomerId, OrderId, PaymentId};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::customer::{find_customer, refresh_pending_balance_in};
use super::error::RepositoryError;
use super::mapping::{allocation_from_model, order_from_model, payment_from_model};
use crate::entities::{orders, payment_allocations, payments};

const ENTITY: &str = "payment_allocations";

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// Paying customer.
    pub customer_id: CustomerId,
    /// Date the cash arrived.
    pub received_on: NaiveDate,
    /// Whole units.
    pub amount: Amount,
    /// Method.
    pub method: PaymentMethod,
    /// Cheque number or bank reference.
    pub reference: String,
    /// Free-text notes.
    pub notes: String,
}

/// Replacement values for an existing payment.
#[derive(Debug, Clone)]
pub struct UpdatePaymentInput {
    /// Date the cash arrived.
    pub received_on: NaiveDate,
    /// Whole units.
    pub amount: Amount,
    /// Method.
    pub method: PaymentMethod,
    /// Cheque number or bank reference.
    pub reference: String,
    /// Free-text notes.
    pub notes: String,
}

/// Receivables repository.
#[derive(Debug, Clone)]
pub struct ReceivablesRepository {
    db: DatabaseConnection,
    settings: BillingSettings,
}

impl ReceivablesRepository {
    /// Creates a new receivables repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: BillingSettings) -> Self {
        Self { db, settings }
    }

    /// Records a payment and applies it FIFO to the customer's open invoices.
    ///
    /// # Errors
    ///
    /// Returns `AllocationError::NegativePayment` for a negative amount, or
    /// `RepositoryError::NotFound` for an unknown customer.
    pub async fn record_payment(
        &self,
        input: RecordPaymentInput,
    ) -> Result<(Payment, Vec<PaymentAllocation>), RepositoryError> {
        validate_payment_amount(input.amount)?;

        let txn = self.db.begin().await?;
        find_customer(&txn, input.customer_id).await?;

        let now = Utc::now().into();
        let model = payments::ActiveModel {
            id: Set(PaymentId::new().into_inner()),
            customer_id: Set(input.customer_id.into_inner()),
            received_on: Set(input.received_on),
            amount: Set(input.amount),
            method: Set(input.method.into()),
            reference: Set(input.reference.trim().to_string()),
            notes: Set(input.notes.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| RepositoryError::from_write("payments", e))?;

        tracing::info!(
            payment_id = %model.id,
            customer_id = %input.customer_id,
            amount = model.amount,
            "payment recorded"
        );

        let allocations = fifo_in(&txn, &self.settings, &model, false).await?;
        refresh_pending_balance_in(&txn, input.customer_id, &self.settings).await?;
        txn.commit().await?;

        Ok((payment_from_model(&model), allocations))
    }

    /// Updates a payment. A changed amount reruns FIFO from scratch; a changed
    /// date moves the payment's allocations with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    pub async fn update_payment(
        &self,
        payment_id: PaymentId,
        input: UpdatePaymentInput,
    ) -> Result<Payment, RepositoryError> {
        validate_payment_amount(input.amount)?;

        let txn = self.db.begin().await?;
        let existing = find_payment(&txn, payment_id).await?;
        let amount_changed = existing.amount != input.amount;
        let date_changed = existing.received_on != input.received_on;

        let mut active: payments::ActiveModel = existing.into();
        active.received_on = Set(input.received_on);
        active.amount = Set(input.amount);
        active.method = Set(input.method.into());
        active.reference = Set(input.reference.trim().to_string());
        active.notes = Set(input.notes.trim().to_string());
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&txn).await?;

        if date_changed {
            payment_allocations::Entity::update_many()
                .col_expr(payment_allocations::Column::AppliedOn, Expr::value(model.received_on))
                .col_expr(
                    payment_allocations::Column::UpdatedAt,
                    Expr::value(DateTime::<FixedOffset>::from(Utc::now())),
                )
                .filter(payment_allocations::Column::PaymentId.eq(model.id))
                .exec(&txn)
                .await?;
        }
        if amount_changed {
            fifo_in(&txn, &self.settings, &model, true).await?;
        }

        let customer_id = CustomerId::from_uuid(model.customer_id);
        refresh_pending_balance_in(&txn, customer_id, &self.settings).await?;
        txn.commit().await?;

        tracing::info!(payment_id = %payment_id, amount_changed, date_changed, "payment updated");
        Ok(payment_from_model(&model))
    }

    /// Deletes a payment together with its allocations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    pub async fn delete_payment(&self, payment_id: PaymentId) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        let payment = find_payment(&txn, payment_id).await?;

        payment_allocations::Entity::delete_many()
            .filter(payment_allocations::Column::PaymentId.eq(payment.id))
            .exec(&txn)
            .await?;
        payments::Entity::delete_by_id(payment.id).exec(&txn).await?;

        refresh_pending_balance_in(&txn, CustomerId::from_uuid(payment.customer_id), &self.settings).await?;
        txn.commit().await?;

        tracing::info!(payment_id = %payment_id, "payment deleted");
        Ok(())
    }

    /// Sets the (payment, order) allocation to `request`.
    ///
    /// # Errors
    ///
    /// Returns the `AllocationError` of the first violated bound, or
    /// `RepositoryError::Integrity` if a concurrent writer created the pair.
    pub async fn allocate(
        &self,
        payment_id: PaymentId,
        order_id: OrderId,
        request: AllocationRequest,
    ) -> Result<PaymentAllocation, RepositoryError> {
        let txn = self.db.begin().await?;
        let payment = find_payment(&txn, payment_id).await?;
        let allocation = allocate_in(&txn, &self.settings, &payment, order_id, request).await?;
        refresh_pending_balance_in(&txn, CustomerId::from_uuid(payment.customer_id), &self.settings).await?;
        txn.commit().await?;
        Ok(allocation)
    }

    /// Removes the (payment, order) allocation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    pub async fn remove_allocation(&self, payment_id: PaymentId, order_id: OrderId) -> Result<u64, RepositoryError> {
        let txn = self.db.begin().await?;
        let payment = find_payment(&txn, payment_id).await?;
        let result = payment_allocations::Entity::delete_many()
            .filter(payment_allocations::Column::PaymentId.eq(payment.id))
            .filter(payment_allocations::Column::OrderId.eq(order_id.into_inner()))
            .exec(&txn)
            .await?;
        refresh_pending_balance_in(&txn, CustomerId::from_uuid(payment.customer_id), &self.settings).await?;
        txn.commit().await?;
        Ok(result.rows_affected)
    }

    /// Applies a payment's unapplied cash FIFO. With `reset`, the payment's
    /// existing allocations are dropped first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    pub async fn auto_allocate(&self, payment_id: PaymentId, reset: bool) -> Result<Vec<PaymentAllocation>, RepositoryError> {
        let txn = self.db.begin().await?;
        let payment = find_payment(&txn, payment_id).await?;
        let allocations = fifo_in(&txn, &self.settings, &payment, reset).await?;
        refresh_pending_balance_in(&txn, CustomerId::from_uuid(payment.customer_id), &self.settings).await?;
        txn.commit().await?;
        Ok(allocations)
    }

    /// Runs FIFO for every payment of the customer that still has cash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn allocate_unapplied_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<PaymentAllocation>, RepositoryError> {
        let txn = self.db.begin().await?;
        find_customer(&txn, customer_id).await?;
        let allocations = allocate_unapplied_for_customer_in(&txn, &self.settings, customer_id).await?;
        refresh_pending_balance_in(&txn, customer_id, &self.settings).await?;
        txn.commit().await?;
        Ok(allocations)
    }

    /// Cash of the payment not applied to any order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    pub async fn unapplied_amount(&self, payment_id: PaymentId) -> Result<Amount, RepositoryError> {
        let payment = payment_from_model(&find_payment(&self.db, payment_id).await?);
        let allocations = self.allocations_for_payment(payment_id).await?;
        Ok(unapplied_amount(&payment, &allocations))
    }

    /// Finds a payment by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    pub async fn find_payment(&self, payment_id: PaymentId) -> Result<Payment, RepositoryError> {
        Ok(payment_from_model(&find_payment(&self.db, payment_id).await?))
    }

    /// Payments of a customer, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_payments(&self, customer_id: CustomerId) -> Result<Vec<Payment>, RepositoryError> {
        let rows = payments::Entity::find()
            .filter(payments::Column::CustomerId.eq(customer_id.into_inner()))
            .order_by_asc(payments::Column::ReceivedOn)
            .order_by_asc(payments::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.iter().map(payment_from_model).collect())
    }

    /// Allocations drawn from a payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn allocations_for_payment(&self, payment_id: PaymentId) -> Result<Vec<PaymentAllocation>, RepositoryError> {
        let rows = payment_allocations::Entity::find()
            .filter(payment_allocations::Column::PaymentId.eq(payment_id.into_inner()))
            .all(&self.db)
            .await?;
        Ok(rows.iter().map(allocation_from_model).collect())
    }

    /// Allocations settling an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn allocations_for_order(&self, order_id: OrderId) -> Result<Vec<PaymentAllocation>, RepositoryError> {
        let rows = payment_allocations::Entity::find()
            .filter(payment_allocations::Column::OrderId.eq(order_id.into_inner()))
            .all(&self.db)
            .await?;
        Ok(rows.iter().map(allocation_from_model).collect())
    }
}

pub(crate) async fn find_payment<C: ConnectionTrait>(
    conn: &C,
    payment_id: PaymentId,
) -> Result<payments::Model, RepositoryError> {
    payments::Entity::find_by_id(payment_id.into_inner())
        .one(conn)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity: "payment",
            id: payment_id.into_inner(),
        })
}

/// Validates and writes the (payment, order) row.
pub(crate) async fn allocate_in<C: ConnectionTrait>(
    conn: &C,
    settings: &BillingSettings,
    payment: &payments::Model,
    order_id: OrderId,
    request: AllocationRequest,
) -> Result<PaymentAllocation, RepositoryError> {
    let order = orders::Entity::find_by_id(order_id.into_inner())
        .one(conn)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity: "order",
            id: order_id.into_inner(),
        })?;
    if order.customer_id != payment.customer_id {
        return Err(AllocationError::CustomerMismatch.into());
    }

    let order = order_from_model(&order);
    let grand_total = OrderTotals::compute(&order, settings.tax_ratio()).grand_total;

    let rows = payment_allocations::Entity::find()
        .filter(
            Condition::any()
                .add(payment_allocations::Column::PaymentId.eq(payment.id))
                .add(payment_allocations::Column::OrderId.eq(order_id.into_inner())),
        )
        .all(conn)
        .await?;
    let allocations: Vec<_> = rows.iter().map(allocation_from_model).collect();

    let payment_id = PaymentId::from_uuid(payment.id);
    let bounds = AllocationBounds::from_rows(
        payment_id,
        payment.amount,
        order_id,
        order.status,
        grand_total,
        &allocations,
        settings.allocation_tolerance,
    );
    validate_allocation(&bounds, request)?;

    let now = Utc::now().into();
    let existing = rows
        .into_iter()
        .find(|row| row.payment_id == payment.id && row.order_id == order_id.into_inner());
    let model = match existing {
        Some(row) => {
            let mut active: payment_allocations::ActiveModel = row.into();
            active.amount = Set(request.amount);
            active.rounding_adjustment = Set(request.rounding_adjustment);
            active.applied_on = Set(payment.received_on);
            active.updated_at = Set(now);
            active.update(conn).await?
        }
        None => payment_allocations::ActiveModel {
            id: Set(AllocationId::new().into_inner()),
            payment_id: Set(payment.id),
            order_id: Set(order_id.into_inner()),
            amount: Set(request.amount),
            rounding_adjustment: Set(request.rounding_adjustment),
            applied_on: Set(payment.received_on),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| RepositoryError::from_write(ENTITY, e))?,
    };

    tracing::info!(
        payment_id = %payment_id,
        order_id = %order_id,
        amount = request.amount,
        rounding_adjustment = request.rounding_adjustment,
        "allocation saved"
    );
    Ok(allocation_from_model(&model))
}

/// Spreads the payment's unapplied cash over the customer's final orders with
/// an outstanding balance, oldest first.
pub(crate) async fn fifo_in<C: ConnectionTrait>(
    conn: &C,
    settings: &BillingSettings,
    payment: &payments::Model,
    reset: bool,
) -> Result<Vec<PaymentAllocation>, RepositoryError> {
    if reset {
        let removed = payment_allocations::Entity::delete_many()
            .filter(payment_allocations::Column::PaymentId.eq(payment.id))
            .exec(conn)
            .await?;
        tracing::info!(payment_id = %payment.id, removed = removed.rows_affected, "payment allocations reset");
    }

    let own_rows = payment_allocations::Entity::find()
        .filter(payment_allocations::Column::PaymentId.eq(payment.id))
        .all(conn)
        .await?;
    let available = payment.amount - own_rows.iter().map(|a| a.amount).sum::<Amount>();
    if available <= 0 {
        return Ok(Vec::new());
    }

    let tax_ratio = settings.tax_ratio();
    let final_orders: Vec<_> = orders::Entity::find()
        .filter(orders::Column::CustomerId.eq(payment.customer_id))
        .all(conn)
        .await?
        .iter()
        .map(order_from_model)
        .filter(|order| order.status.is_final())
        .collect();
    if final_orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<_> = final_orders.iter().map(|o| o.id.into_inner()).collect();
    let mut settled: HashMap<_, Amount> = HashMap::new();
    for row in payment_allocations::Entity::find()
        .filter(payment_allocations::Column::OrderId.is_in(order_ids))
        .all(conn)
        .await?
    {
        *settled.entry(row.order_id).or_default() += row.amount + row.rounding_adjustment;
    }
    let on_payment: HashMap<_, _> = own_rows
        .iter()
        .map(|row| (row.order_id, (row.amount, row.rounding_adjustment)))
        .collect();

    let invoices: Vec<OpenInvoice> = final_orders
        .iter()
        .map(|order| {
            let id = order.id.into_inner();
            let grand_total = OrderTotals::compute(order, tax_ratio).grand_total;
            OpenInvoice {
                order_id: order.id,
                order_date: order.order_date,
                outstanding: grand_total - settled.get(&id).copied().unwrap_or_default(),
                existing_on_payment: on_payment.get(&id).map_or(0, |(amount, _)| *amount),
            }
        })
        .collect();

    let mut written = Vec::new();
    for step in plan_fifo(available, &invoices) {
        let rounding = on_payment
            .get(&step.order_id.into_inner())
            .map_or(0, |(_, rounding)| *rounding);
        let request = AllocationRequest {
            amount: step.new_amount,
            rounding_adjustment: rounding,
        };
        written.push(allocate_in(conn, settings, payment, step.order_id, request).await?);
    }

    tracing::info!(
        payment_id = %payment.id,
        available,
        allocations = written.len(),
        reset,
        "FIFO allocation applied"
    );
    Ok(written)
}

/// Removes or trims the order's allocations so a non-final order carries none
/// and a final one carries no more than its grand total plus tolerance.
/// Returns the number of rows changed.
pub(crate) async fn release_order_allocations_in<C: ConnectionTrait>(
    conn: &C,
    settings: &BillingSettings,
    order: &Order,
) -> Result<usize, RepositoryError> {
    let allocations: Vec<_> = payment_allocations::Entity::find()
        .filter(payment_allocations::Column::OrderId.eq(order.id.into_inner()))
        .all(conn)
        .await?
        .iter()
        .map(allocation_from_model)
        .collect();
    if allocations.is_empty() {
        return Ok(0);
    }

    let grand_total = OrderTotals::compute(order, settings.tax_ratio()).grand_total;
    let steps = plan_release(order.status, grand_total, settings.allocation_tolerance, &allocations);
    let now: DateTime<FixedOffset> = Utc::now().into();
    for step in &steps {
        match *step {
            ReleaseStep::Remove(id) => {
                payment_allocations::Entity::delete_by_id(id.into_inner()).exec(conn).await?;
            }
            ReleaseStep::Trim { id, amount } => {
                payment_allocations::Entity::update_many()
                    .col_expr(payment_allocations::Column::Amount, Expr::value(amount))
                    .col_expr(payment_allocations::Column::RoundingAdjustment, Expr::value(0_i64))
                    .col_expr(payment_allocations::Column::UpdatedAt, Expr::value(now))
                    .filter(payment_allocations::Column::Id.eq(id.into_inner()))
                    .exec(conn)
                    .await?;
            }
        }
    }

    if !steps.is_empty() {
        tracing::info!(
            order_id = %order.id,
            status = %order.status,
            grand_total,
            changed = steps.len(),
            "order allocations released"
        );
    }
    Ok(steps.len())
}

/// Runs FIFO for each of the customer's payments, oldest first.
pub(crate) async fn allocate_unapplied_for_customer_in<C: ConnectionTrait>(
    conn: &C,
    settings: &BillingSettings,
    customer_id: CustomerId,
) -> Result<Vec<PaymentAllocation>, RepositoryError> {
    let payments = payments::Entity::find()
        .filter(payments::Column::CustomerId.eq(customer_id.into_inner()))
        .order_by_asc(payments::Column::ReceivedOn)
        .order_by_asc(payments::Column::Id)
        .all(conn)
        .await?;

    let mut written = Vec::new();
    for payment in &payments {
        written.extend(fifo_in(conn, settings, payment, false).await?);
    }
    Ok(written)
}
