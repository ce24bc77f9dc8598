//! `SeaORM` Entity for supplier_payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentMethod;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "supplier_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub supplier_name: String,
    pub paid_on: Date,
    pub method: PaymentMethod,
    pub bank: String,
    pub reference: String,
    pub amount: i64,
    pub notes: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_payment_links::Entity")]
    PurchasePaymentLinks,
}

impl Related<super::purchase_payment_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchasePaymentLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
