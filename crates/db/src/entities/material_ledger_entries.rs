//! `SeaORM` Entity for material_ledger_entries table.
//!
//! A row is owned by a customer (`party_kind = CUSTOMER`, `customer_id` set) or
//! by company stock (`party_kind = COMPANY_STOCK`, `customer_id` null).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{EntryType, MaterialType, PartyKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "material_ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub party_kind: PartyKind,
    pub customer_id: Option<Uuid>,
    pub entry_type: EntryType,
    pub delta_grams: i64,
    pub entry_date: Date,
    pub material_type: Option<MaterialType>,
    pub memo: String,
    pub order_id: Option<Uuid>,
    pub receipt_id: Option<Uuid>,
    pub raw_txn_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Orders,
    #[sea_orm(
        belongs_to = "super::material_receipts::Entity",
        from = "Column::ReceiptId",
        to = "super::material_receipts::Column::Id"
    )]
    MaterialReceipts,
    #[sea_orm(
        belongs_to = "super::raw_material_txns::Entity",
        from = "Column::RawTxnId",
        to = "super::raw_material_txns::Column::Id"
    )]
    RawMaterialTxns,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::material_receipts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaterialReceipts.def()
    }
}

impl Related<super::raw_material_txns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RawMaterialTxns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
