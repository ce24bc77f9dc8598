//! `SeaORM` Entity for raw_material_txns table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{MaterialType, PartyKind, RawTxnKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "raw_material_txns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: RawTxnKind,
    pub txn_date: Date,
    pub supplier_name: Option<String>,
    pub from_party_kind: Option<PartyKind>,
    pub from_customer_id: Option<Uuid>,
    pub to_party_kind: PartyKind,
    pub to_customer_id: Option<Uuid>,
    pub qty_grams: i64,
    pub bags_count: i32,
    pub rate_hundredths: i64,
    pub amount: i64,
    pub material_type: MaterialType,
    pub dc_number: String,
    pub memo: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::material_ledger_entries::Entity")]
    MaterialLedgerEntries,
    #[sea_orm(has_many = "super::purchase_payment_links::Entity")]
    PurchasePaymentLinks,
}

impl Related<super::material_ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaterialLedgerEntries.def()
    }
}

impl Related<super::purchase_payment_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchasePaymentLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
