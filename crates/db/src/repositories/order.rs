//! Order repository.
//!
//! Saving an order runs a fixed list of post-write hooks inside the same
//! transaction: material sync, release of allocations the order can no longer
//! carry, balance refresh, then FIFO for unapplied cash when the order has
//! just become billable or gave cash back.

use chrono::{NaiveDate, Utc};
use polyroll_core::material::{MaterialKind, Party, balance_as_of, order_consumption};
use polyroll_core::orders::{
    Order, OrderRoll, OrderSettlement, OrderStatus, OrderTotals, available_for_order,
    invoice_number, invoice_sequence, produced_kg, validate_roll_weight, validate_transition,
};
use polyroll_shared::BillingSettings;
use polyroll_shared::types::{
    CustomerId, OrderId, OrderRollId, grams_from_kg, normalize_rate, rate_to_hundredths,
    to_weight_kg,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::customer::{find_customer, refresh_pending_balance_in};
use super::error::RepositoryError;
use super::mapping::{allocation_from_model, order_from_model, roll_from_model};
use super::material_ledger::{apply_sync, delete_by_order, entries_for_party, order_consumption_delta};
use super::receivables::{allocate_unapplied_for_customer_in, release_order_allocations_in};
use crate::entities::{order_rolls, orders, payment_allocations};

/// Steps run after an order row is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderHook {
    /// Upsert or remove the order's consumption row.
    SyncMaterial,
    /// Drop allocations of a non-final order; trim those above its total.
    ReleaseAllocations,
    /// Recompute the customer's cached pending balance.
    RefreshBalance,
    /// Apply the customer's unapplied payments FIFO.
    AllocateUnapplied,
}

/// Hooks in the order they run.
pub const ORDER_SAVE_HOOKS: [OrderHook; 4] = [
    OrderHook::SyncMaterial,
    OrderHook::ReleaseAllocations,
    OrderHook::RefreshBalance,
    OrderHook::AllocateUnapplied,
];

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Business date.
    pub order_date: NaiveDate,
    /// Initial status.
    pub status: OrderStatus,
    /// Booked weight.
    pub target_total_kg: Decimal,
    /// Unit price.
    pub price_per_kg: Decimal,
    /// Whether tax is charged.
    pub include_tax: bool,
    /// Allowed deviation; the configured default when `None`.
    pub tolerance_kg: Option<Decimal>,
    /// Material category.
    pub material_type: Option<MaterialKind>,
}

/// Replacement values for the editable fields of an order.
#[derive(Debug, Clone)]
pub struct UpdateOrderInput {
    /// Business date.
    pub order_date: NaiveDate,
    /// Status.
    pub status: OrderStatus,
    /// Booked weight.
    pub target_total_kg: Decimal,
    /// Unit price.
    pub price_per_kg: Decimal,
    /// Whether tax is charged.
    pub include_tax: bool,
    /// Allowed deviation.
    pub tolerance_kg: Decimal,
    /// Material category.
    pub material_type: Option<MaterialKind>,
}

impl From<&Order> for UpdateOrderInput {
    fn from(order: &Order) -> Self {
        Self {
            order_date: order.order_date,
            status: order.status,
            target_total_kg: order.target_total_kg,
            price_per_kg: order.price_per_kg,
            include_tax: order.include_tax,
            tolerance_kg: order.tolerance_kg,
            material_type: order.material_type,
        }
    }
}

/// Order repository.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
    settings: BillingSettings,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: BillingSettings) -> Self {
        Self { db, settings }
    }

    /// Creates an order with the next invoice number.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InsufficientMaterial` when created CONFIRMED without
    /// enough material, or `RepositoryError::NotFound` for an unknown customer.
    pub async fn create_order(&self, input: CreateOrderInput) -> Result<Order, RepositoryError> {
        let txn = self.db.begin().await?;
        find_customer(&txn, input.customer_id).await?;

        let order = Order {
            id: OrderId::new(),
            customer_id: input.customer_id,
            invoice_number: next_invoice_number(&txn).await?,
            order_date: input.order_date,
            status: input.status,
            target_total_kg: to_weight_kg(input.target_total_kg),
            produced_kg: Decimal::ZERO,
            price_per_kg: normalize_rate(input.price_per_kg),
            include_tax: input.include_tax,
            tolerance_kg: to_weight_kg(input.tolerance_kg.unwrap_or(self.settings.default_tolerance_kg)),
            material_type: input.material_type,
        };

        check_transition(&txn, None, &order).await?;

        let now = Utc::now().into();
        orders::ActiveModel {
            id: Set(order.id.into_inner()),
            customer_id: Set(order.customer_id.into_inner()),
            invoice_number: Set(order.invoice_number.clone()),
            order_date: Set(order.order_date),
            status: Set(order.status.into()),
            target_total_grams: Set(grams_from_kg(order.target_total_kg)),
            produced_grams: Set(0),
            price_per_kg_hundredths: Set(rate_to_hundredths(order.price_per_kg)),
            include_tax: Set(order.include_tax),
            tolerance_grams: Set(grams_from_kg(order.tolerance_kg)),
            material_type: Set(order.material_type.map(Into::into)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| RepositoryError::from_write("orders", e))?;

        tracing::info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            invoice_number = %order.invoice_number,
            status = %order.status,
            "order created"
        );

        run_hooks(&txn, &self.settings, None, &order).await?;
        txn.commit().await?;
        Ok(order)
    }

    /// Saves the editable fields of an order and runs the hooks.
    ///
    /// # Errors
    ///
    /// Returns the `OrderError` of a rejected transition, or
    /// `RepositoryError::NotFound` if the order does not exist.
    pub async fn save_order(&self, order_id: OrderId, input: UpdateOrderInput) -> Result<Order, RepositoryError> {
        let txn = self.db.begin().await?;
        let order = save_in(&txn, &self.settings, order_id, input).await?;
        txn.commit().await?;
        Ok(order)
    }

    /// Moves an order to `status`, keeping its other fields.
    ///
    /// # Errors
    ///
    /// Returns the `OrderError` of a rejected transition.
    pub async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, RepositoryError> {
        let txn = self.db.begin().await?;
        let current = order_from_model(&find_order(&txn, order_id).await?);
        let input = UpdateOrderInput {
            status,
            ..UpdateOrderInput::from(&current)
        };
        let order = save_in(&txn, &self.settings, order_id, input).await?;
        txn.commit().await?;
        Ok(order)
    }

    /// Records a produced roll and re-runs the hooks.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::RollTooLight` below 0.001 kg.
    pub async fn add_roll(&self, order_id: OrderId, weight_kg: Decimal) -> Result<OrderRoll, RepositoryError> {
        let weight_kg = validate_roll_weight(weight_kg)?;

        let txn = self.db.begin().await?;
        find_order(&txn, order_id).await?;
        let model = order_rolls::ActiveModel {
            id: Set(OrderRollId::new().into_inner()),
            order_id: Set(order_id.into_inner()),
            weight_grams: Set(grams_from_kg(weight_kg)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        sync_produced(&txn, &self.settings, order_id).await?;
        txn.commit().await?;

        tracing::info!(order_id = %order_id, %weight_kg, "roll added");
        Ok(roll_from_model(&model))
    }

    /// Removes a produced roll and re-runs the hooks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the roll does not exist.
    pub async fn remove_roll(&self, roll_id: OrderRollId) -> Result<Order, RepositoryError> {
        let txn = self.db.begin().await?;
        let roll = order_rolls::Entity::find_by_id(roll_id.into_inner())
            .one(&txn)
            .await?
            .ok_or(RepositoryError::NotFound {
                entity: "order roll",
                id: roll_id.into_inner(),
            })?;
        order_rolls::Entity::delete_by_id(roll.id).exec(&txn).await?;

        let order = sync_produced(&txn, &self.settings, OrderId::from_uuid(roll.order_id)).await?;
        txn.commit().await?;

        tracing::info!(order_id = %order.id, roll_id = %roll_id, "roll removed");
        Ok(order)
    }

    /// Deletes an order with its rolls, allocations and ledger rows. Cash the
    /// order held goes back through FIFO.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn delete_order(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        let order = find_order(&txn, order_id).await?;

        delete_by_order(&txn, order_id).await?;
        payment_allocations::Entity::delete_many()
            .filter(payment_allocations::Column::OrderId.eq(order.id))
            .exec(&txn)
            .await?;
        order_rolls::Entity::delete_many()
            .filter(order_rolls::Column::OrderId.eq(order.id))
            .exec(&txn)
            .await?;
        orders::Entity::delete_by_id(order.id).exec(&txn).await?;

        let customer_id = CustomerId::from_uuid(order.customer_id);
        refresh_pending_balance_in(&txn, customer_id, &self.settings).await?;
        allocate_unapplied_for_customer_in(&txn, &self.settings, customer_id).await?;
        txn.commit().await?;

        tracing::info!(order_id = %order_id, invoice_number = %order.invoice_number, "order deleted");
        Ok(())
    }

    /// Finds an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn find_by_id(&self, order_id: OrderId) -> Result<Order, RepositoryError> {
        Ok(order_from_model(&find_order(&self.db, order_id).await?))
    }

    /// Orders of a customer, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, RepositoryError> {
        let rows = orders::Entity::find()
            .filter(orders::Column::CustomerId.eq(customer_id.into_inner()))
            .order_by_asc(orders::Column::OrderDate)
            .order_by_asc(orders::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.iter().map(order_from_model).collect())
    }

    /// Produced rolls of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn rolls(&self, order_id: OrderId) -> Result<Vec<OrderRoll>, RepositoryError> {
        let rows = order_rolls::Entity::find()
            .filter(order_rolls::Column::OrderId.eq(order_id.into_inner()))
            .order_by_asc(order_rolls::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.iter().map(roll_from_model).collect())
    }

    /// Billed totals of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn totals(&self, order_id: OrderId) -> Result<OrderTotals, RepositoryError> {
        let order = self.find_by_id(order_id).await?;
        Ok(OrderTotals::compute(&order, self.settings.tax_ratio()))
    }

    /// Grand total against the cash and write-offs applied so far.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn settlement(&self, order_id: OrderId) -> Result<OrderSettlement, RepositoryError> {
        let totals = self.totals(order_id).await?;
        let allocations: Vec<_> = payment_allocations::Entity::find()
            .filter(payment_allocations::Column::OrderId.eq(order_id.into_inner()))
            .all(&self.db)
            .await?
            .iter()
            .map(allocation_from_model)
            .collect();
        Ok(OrderSettlement {
            grand_total: totals.grand_total,
            allocated: allocations.iter().map(|a| a.amount).sum(),
            adjustments: allocations.iter().map(|a| a.rounding_adjustment).sum(),
        })
    }
}

async fn find_order<C: ConnectionTrait>(conn: &C, order_id: OrderId) -> Result<orders::Model, RepositoryError> {
    orders::Entity::find_by_id(order_id.into_inner())
        .one(conn)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity: "order",
            id: order_id.into_inner(),
        })
}

/// Highest existing invoice sequence plus one.
async fn next_invoice_number<C: ConnectionTrait>(conn: &C) -> Result<String, RepositoryError> {
    let numbers: Vec<String> = orders::Entity::find()
        .select_only()
        .column(orders::Column::InvoiceNumber)
        .into_tuple()
        .all(conn)
        .await?;
    let last = numbers.iter().filter_map(|n| invoice_sequence(n)).max().unwrap_or(0);
    Ok(invoice_number(last + 1))
}

/// Validates the move from `previous` against the customer's current material.
async fn check_transition<C: ConnectionTrait>(
    conn: &C,
    previous: Option<OrderStatus>,
    order: &Order,
) -> Result<(), RepositoryError> {
    let party = Party::Customer(order.customer_id);
    let entries = entries_for_party(conn, party, None).await?;
    let balance = balance_as_of(&entries, party, NaiveDate::MAX);
    let own = order_consumption_delta(conn, order.id).await?;
    validate_transition(previous, order, available_for_order(balance, own))?;
    Ok(())
}

async fn save_in<C: ConnectionTrait>(
    conn: &C,
    settings: &BillingSettings,
    order_id: OrderId,
    input: UpdateOrderInput,
) -> Result<Order, RepositoryError> {
    let existing = find_order(conn, order_id).await?;
    let previous = order_from_model(&existing);

    let order = Order {
        order_date: input.order_date,
        status: input.status,
        target_total_kg: to_weight_kg(input.target_total_kg),
        price_per_kg: normalize_rate(input.price_per_kg),
        include_tax: input.include_tax,
        tolerance_kg: to_weight_kg(input.tolerance_kg),
        material_type: input.material_type,
        ..previous.clone()
    };
    check_transition(conn, Some(previous.status), &order).await?;

    let mut active: orders::ActiveModel = existing.into();
    active.order_date = Set(order.order_date);
    active.status = Set(order.status.into());
    active.target_total_grams = Set(grams_from_kg(order.target_total_kg));
    active.price_per_kg_hundredths = Set(rate_to_hundredths(order.price_per_kg));
    active.include_tax = Set(order.include_tax);
    active.tolerance_grams = Set(grams_from_kg(order.tolerance_kg));
    active.material_type = Set(order.material_type.map(Into::into));
    active.updated_at = Set(Utc::now().into());
    active.update(conn).await?;

    tracing::info!(
        order_id = %order.id,
        from = %previous.status,
        to = %order.status,
        target_kg = %order.target_total_kg,
        "order saved"
    );

    run_hooks(conn, settings, Some(previous.status), &order).await?;
    Ok(order)
}

/// Recomputes `produced_grams` from the rolls and re-runs the hooks.
async fn sync_produced<C: ConnectionTrait>(
    conn: &C,
    settings: &BillingSettings,
    order_id: OrderId,
) -> Result<Order, RepositoryError> {
    let rolls: Vec<_> = order_rolls::Entity::find()
        .filter(order_rolls::Column::OrderId.eq(order_id.into_inner()))
        .all(conn)
        .await?
        .iter()
        .map(roll_from_model)
        .collect();
    let produced = produced_kg(&rolls);

    let existing = find_order(conn, order_id).await?;
    let status = OrderStatus::from(existing.status);
    let mut active: orders::ActiveModel = existing.into();
    active.produced_grams = Set(grams_from_kg(produced));
    active.updated_at = Set(Utc::now().into());
    let model = active.update(conn).await?;

    let order = order_from_model(&model);
    run_hooks(conn, settings, Some(status), &order).await?;
    Ok(order)
}

async fn run_hooks<C: ConnectionTrait>(
    conn: &C,
    settings: &BillingSettings,
    previous: Option<OrderStatus>,
    order: &Order,
) -> Result<(), RepositoryError> {
    let mut released = 0;
    for hook in ORDER_SAVE_HOOKS {
        match hook {
            OrderHook::SyncMaterial => apply_sync(conn, &order_consumption(order)?).await?,
            OrderHook::ReleaseAllocations => {
                released = release_order_allocations_in(conn, settings, order).await?;
            }
            OrderHook::RefreshBalance => {
                refresh_pending_balance_in(conn, order.customer_id, settings).await?;
            }
            OrderHook::AllocateUnapplied => {
                let became_final = order.status.is_final() && !previous.is_some_and(OrderStatus::is_final);
                if became_final || released > 0 {
                    let written = allocate_unapplied_for_customer_in(conn, settings, order.customer_id).await?;
                    tracing::debug!(order_id = %order.id, allocations = written.len(), "unapplied cash allocated");
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooks_release_before_refresh_before_allocation() {
        assert_eq!(
            ORDER_SAVE_HOOKS,
            [
                OrderHook::SyncMaterial,
                OrderHook::ReleaseAllocations,
                OrderHook::RefreshBalance,
                OrderHook::AllocateUnapplied
            ]
        );
    }

    #[test]
    fn test_update_input_mirrors_order() {
        let order = Order {
            id: OrderId::new(),
            customer_id: CustomerId::new(),
            invoice_number: invoice_number(4),
            order_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            status: OrderStatus::Confirmed,
            target_total_kg: Decimal::new(120_000, 3),
            produced_kg: Decimal::ZERO,
            price_per_kg: Decimal::new(31_050, 2),
            include_tax: true,
            tolerance_kg: Decimal::new(500, 3),
            material_type: Some(MaterialKind::Film),
        };
        let input = UpdateOrderInput::from(&order);
        assert_eq!(input.status, OrderStatus::Confirmed);
        assert_eq!(input.target_total_kg, order.target_total_kg);
        assert_eq!(input.material_type, Some(MaterialKind::Film));
    }
}
