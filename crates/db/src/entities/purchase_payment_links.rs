//! `SeaORM` Entity for purchase_payment_links table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_payment_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub payment_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::raw_material_txns::Entity",
        from = "Column::PurchaseId",
        to = "super::raw_material_txns::Column::Id"
    )]
    RawMaterialTxns,
    #[sea_orm(
        belongs_to = "super::supplier_payments::Entity",
        from = "Column::PaymentId",
        to = "super::supplier_payments::Column::Id"
    )]
    SupplierPayments,
}

impl Related<super::raw_material_txns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RawMaterialTxns.def()
    }
}

impl Related<super::supplier_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupplierPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
