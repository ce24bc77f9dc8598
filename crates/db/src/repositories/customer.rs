//! Customer repository: balances, statements and the balances export.
//!
//! Every figure is recomputed from orders, payments, allocations and the
//! material ledger. The `pending_balance` column is only a cache for list views.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use polyroll_core::balance::{
    AdjustmentLine, BilledOrder, Customer, CustomerAccount, PaymentLine, SurchargePolicy,
};
use polyroll_core::material::Party;
use polyroll_core::orders::OrderStatus;
use polyroll_core::statement::{CustomerBalanceRow, PeriodStatement, write_customer_balances_csv};
use polyroll_shared::BillingSettings;
use polyroll_shared::types::{Amount, CustomerId, OrderId, normalize_rate, rate_to_hundredths};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;

use super::error::RepositoryError;
use super::mapping::{allocation_from_model, customer_from_model, order_from_model, payment_from_model};
use super::material_ledger::entries_for_party;
use crate::entities::{customers, orders, payment_allocations, payments};

/// Input for creating a customer.
#[derive(Debug, Clone, Default)]
pub struct CreateCustomerInput {
    /// Company name, required.
    pub company_name: String,
    /// Contact person.
    pub contact_name: String,
    /// Phone number.
    pub phone: String,
    /// Balance carried over from before the ledger began.
    pub previous_pending_balance: Amount,
    /// Surcharge toggle override.
    pub shortfall_enabled: Option<bool>,
    /// Surcharge rate override.
    pub shortfall_rate_per_kg: Option<Decimal>,
}

/// Customer repository.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
    settings: BillingSettings,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: BillingSettings) -> Self {
        Self { db, settings }
    }

    /// Creates a customer with its carry-forward balance.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank company name or a
    /// negative surcharge rate.
    pub async fn create(&self, input: CreateCustomerInput) -> Result<Customer, RepositoryError> {
        let company_name = input.company_name.trim().to_string();
        if company_name.is_empty() {
            return Err(RepositoryError::Validation("company name is required".into()));
        }
        let rate = validate_rate(input.shortfall_rate_per_kg)?;

        let now = Utc::now().into();
        let model = customers::ActiveModel {
            id: Set(CustomerId::new().into_inner()),
            company_name: Set(company_name),
            contact_name: Set(input.contact_name.trim().to_string()),
            phone: Set(input.phone.trim().to_string()),
            previous_pending_balance: Set(input.previous_pending_balance),
            pending_balance: Set(input.previous_pending_balance),
            shortfall_enabled: Set(input.shortfall_enabled),
            shortfall_rate_hundredths: Set(rate.map(rate_to_hundredths)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| RepositoryError::from_write("customers", e))?;

        tracing::info!(customer_id = %model.id, company = %model.company_name, "customer created");
        Ok(customer_from_model(&model))
    }

    /// Finds a customer by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn find_by_id(&self, customer_id: CustomerId) -> Result<Customer, RepositoryError> {
        Ok(customer_from_model(&find_customer(&self.db, customer_id).await?))
    }

    /// Lists customers by company name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = customers::Entity::find()
            .order_by_asc(customers::Column::CompanyName)
            .all(&self.db)
            .await?;
        Ok(rows.iter().map(customer_from_model).collect())
    }

    /// Replaces the carry-forward balance and refreshes the cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn set_carry_forward(&self, customer_id: CustomerId, amount: Amount) -> Result<Amount, RepositoryError> {
        let txn = self.db.begin().await?;
        let mut active: customers::ActiveModel = find_customer(&txn, customer_id).await?.into();
        active.previous_pending_balance = Set(amount);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;
        let pending = refresh_pending_balance_in(&txn, customer_id, &self.settings).await?;
        txn.commit().await?;
        Ok(pending)
    }

    /// Sets or clears the customer's surcharge overrides.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a negative rate.
    pub async fn set_surcharge_override(
        &self,
        customer_id: CustomerId,
        enabled: Option<bool>,
        rate_per_kg: Option<Decimal>,
    ) -> Result<Amount, RepositoryError> {
        let rate = validate_rate(rate_per_kg)?;
        let txn = self.db.begin().await?;
        let mut active: customers::ActiveModel = find_customer(&txn, customer_id).await?.into();
        active.shortfall_enabled = Set(enabled);
        active.shortfall_rate_hundredths = Set(rate.map(rate_to_hundredths));
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;
        let pending = refresh_pending_balance_in(&txn, customer_id, &self.settings).await?;
        txn.commit().await?;
        Ok(pending)
    }

    /// Loads the full ledger snapshot of a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn load_account(&self, customer_id: CustomerId) -> Result<CustomerAccount, RepositoryError> {
        load_account_in(&self.db, customer_id, &self.settings).await
    }

    /// Pending balance at the end of `as_of`, computed from source facts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn pending_balance_as_of(&self, customer_id: CustomerId, as_of: NaiveDate) -> Result<Amount, RepositoryError> {
        let account = self.load_account(customer_id).await?;
        Ok(account.pending_balance_as_of(as_of))
    }

    /// Recomputes the cached pending balance over all facts and stores it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn refresh_pending_balance(&self, customer_id: CustomerId) -> Result<Amount, RepositoryError> {
        let txn = self.db.begin().await?;
        let pending = refresh_pending_balance_in(&txn, customer_id, &self.settings).await?;
        txn.commit().await?;
        Ok(pending)
    }

    /// Builds the statement of `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `StatementError::InvalidPeriod` if `start > end`, or
    /// `RepositoryError::NotFound` if the customer does not exist.
    pub async fn statement(
        &self,
        customer_id: CustomerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PeriodStatement, RepositoryError> {
        let account = self.load_account(customer_id).await?;
        let statement = PeriodStatement::build(&account, start, end, &self.settings.shortfall.label)?;
        tracing::info!(
            customer_id = %customer_id,
            %start,
            %end,
            opening = statement.opening_balance,
            closing = statement.closing_balance,
            "statement built"
        );
        Ok(statement)
    }

    /// One row per customer: current material balance and outstanding on final orders.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn balances_report(&self) -> Result<Vec<CustomerBalanceRow>, RepositoryError> {
        let customers = customers::Entity::find()
            .order_by_asc(customers::Column::CompanyName)
            .all(&self.db)
            .await?;

        let mut rows = Vec::with_capacity(customers.len());
        for customer in customers {
            let account = load_account_in(&self.db, CustomerId::from_uuid(customer.id), &self.settings).await?;
            rows.push(CustomerBalanceRow {
                company: customer.company_name,
                contact: customer.contact_name,
                phone: customer.phone,
                material_balance_kg: account.material_balance_as_of(NaiveDate::MAX),
                outstanding_amount: account.outstanding_total(),
            });
        }
        Ok(rows)
    }

    /// Writes the balances report as CSV.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or the CSV cannot be written.
    pub async fn export_balances_csv<W: Write>(&self, writer: W) -> Result<usize, RepositoryError> {
        let rows = self.balances_report().await?;
        write_customer_balances_csv(&rows, writer)?;
        tracing::info!(rows = rows.len(), "customer balances exported");
        Ok(rows.len())
    }
}

fn validate_rate(rate: Option<Decimal>) -> Result<Option<Decimal>, RepositoryError> {
    match rate {
        Some(rate) if rate.is_sign_negative() && !rate.is_zero() => Err(RepositoryError::Validation(
            "surcharge rate must not be negative".into(),
        )),
        other => Ok(other.map(normalize_rate)),
    }
}

pub(crate) async fn find_customer<C: ConnectionTrait>(
    conn: &C,
    customer_id: CustomerId,
) -> Result<customers::Model, RepositoryError> {
    customers::Entity::find_by_id(customer_id.into_inner())
        .one(conn)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity: "customer",
            id: customer_id.into_inner(),
        })
}

/// Loads a customer's orders, payments, write-offs and material rows.
pub(crate) async fn load_account_in<C: ConnectionTrait>(
    conn: &C,
    customer_id: CustomerId,
    settings: &BillingSettings,
) -> Result<CustomerAccount, RepositoryError> {
    let customer = customer_from_model(&find_customer(conn, customer_id).await?);
    let tax_ratio = settings.tax_ratio();

    let order_rows = orders::Entity::find()
        .filter(orders::Column::CustomerId.eq(customer_id.into_inner()))
        .order_by_asc(orders::Column::OrderDate)
        .order_by_asc(orders::Column::Id)
        .all(conn)
        .await?;
    let order_ids: Vec<_> = order_rows.iter().map(|o| o.id).collect();

    let allocations: Vec<_> = if order_ids.is_empty() {
        Vec::new()
    } else {
        payment_allocations::Entity::find()
            .filter(payment_allocations::Column::OrderId.is_in(order_ids))
            .all(conn)
            .await?
            .iter()
            .map(allocation_from_model)
            .collect()
    };

    let mut settled: HashMap<_, Amount> = HashMap::new();
    for allocation in &allocations {
        *settled.entry(allocation.order_id).or_default() += allocation.effective();
    }

    let orders = order_rows
        .iter()
        .map(|row| {
            let order = order_from_model(row);
            let paid = settled.get(&order.id).copied().unwrap_or_default();
            BilledOrder::from_order(&order, tax_ratio, paid)
        })
        .collect();

    let payments = payments::Entity::find()
        .filter(payments::Column::CustomerId.eq(customer_id.into_inner()))
        .order_by_asc(payments::Column::ReceivedOn)
        .order_by_asc(payments::Column::Id)
        .all(conn)
        .await?
        .iter()
        .map(|row| {
            let payment = payment_from_model(row);
            PaymentLine {
                payment_id: payment.id,
                received_on: payment.received_on,
                amount: payment.amount,
                method: payment.method,
                reference: payment.reference,
            }
        })
        .collect();

    let final_orders: HashSet<_> = order_rows
        .iter()
        .filter(|row| OrderStatus::from(row.status).is_final())
        .map(|row| OrderId::from_uuid(row.id))
        .collect();
    let adjustments = allocations
        .iter()
        .filter(|a| a.rounding_adjustment != 0 && final_orders.contains(&a.order_id))
        .map(|a| AdjustmentLine {
            order_id: a.order_id,
            applied_on: a.applied_on,
            amount: a.rounding_adjustment,
        })
        .collect();

    let material_entries = entries_for_party(conn, Party::Customer(customer_id), None).await?;

    Ok(CustomerAccount {
        customer_id,
        carry_forward: customer.previous_pending_balance,
        orders,
        payments,
        adjustments,
        material_entries,
        surcharge: SurchargePolicy::resolve(
            &settings.shortfall,
            customer.shortfall_enabled,
            customer.shortfall_rate_per_kg,
        ),
    })
}

/// Recomputes and stores the cached pending balance.
pub(crate) async fn refresh_pending_balance_in<C: ConnectionTrait>(
    conn: &C,
    customer_id: CustomerId,
    settings: &BillingSettings,
) -> Result<Amount, RepositoryError> {
    let account = load_account_in(conn, customer_id, settings).await?;
    let pending = account.pending_balance_as_of(NaiveDate::MAX);

    customers::Entity::update_many()
        .col_expr(customers::Column::PendingBalance, Expr::value(pending))
        .col_expr(customers::Column::UpdatedAt, Expr::value(DateTime::<FixedOffset>::from(Utc::now())))
        .filter(customers::Column::Id.eq(customer_id.into_inner()))
        .exec(conn)
        .await?;

    tracing::info!(customer_id = %customer_id, pending_balance = pending, "pending balance refreshed");
    Ok(pending)
}
