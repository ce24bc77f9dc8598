//! `SeaORM` string-backed enums shared by the entities.
//!
//! Each maps one-to-one onto its `polyroll_core` counterpart; conversions live
//! here so repositories never handle raw labels.

use polyroll_core::material::{EntryType as CoreEntryType, MaterialKind};
use polyroll_core::orders::OrderStatus as CoreOrderStatus;
use polyroll_core::raw_material::TxnKind as CoreTxnKind;
use polyroll_core::receivables::PaymentMethod as CorePaymentMethod;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum OrderStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "IN_PRODUCTION")]
    InProduction,
    #[sea_orm(string_value = "READY")]
    Ready,
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
    #[sea_orm(string_value = "CLOSED")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum EntryType {
    #[sea_orm(string_value = "IN")]
    In,
    #[sea_orm(string_value = "OUT")]
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PartyKind {
    #[sea_orm(string_value = "CUSTOMER")]
    Customer,
    #[sea_orm(string_value = "COMPANY_STOCK")]
    CompanyStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum MaterialType {
    #[sea_orm(string_value = "FILM")]
    Film,
    #[sea_orm(string_value = "TAPE")]
    Tape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RawTxnKind {
    #[sea_orm(string_value = "PURCHASE")]
    Purchase,
    #[sea_orm(string_value = "SALE")]
    Sale,
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "CASH")]
    Cash,
    #[sea_orm(string_value = "CHEQUE")]
    Cheque,
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

macro_rules! mirror_enum {
    ($db:ident <=> $core:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $($core::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(OrderStatus <=> CoreOrderStatus {
    Draft,
    Confirmed,
    InProduction,
    Ready,
    Delivered,
    Closed,
});
mirror_enum!(EntryType <=> CoreEntryType { In, Out });
mirror_enum!(MaterialType <=> MaterialKind { Film, Tape });
mirror_enum!(RawTxnKind <=> CoreTxnKind { Purchase, Sale, Transfer });
mirror_enum!(PaymentMethod <=> CorePaymentMethod {
    Cash,
    Cheque,
    Transfer,
    Other,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_labels_match_core_labels() {
        for status in CoreOrderStatus::ALL {
            let stored: OrderStatus = status.into();
            assert_eq!(stored.to_value(), status.as_str());
            assert_eq!(CoreOrderStatus::from(stored), status);
        }
        for kind in [CoreTxnKind::Purchase, CoreTxnKind::Sale, CoreTxnKind::Transfer] {
            assert_eq!(RawTxnKind::from(kind).to_value(), kind.as_str());
        }
        for entry_type in [CoreEntryType::In, CoreEntryType::Out] {
            assert_eq!(EntryType::from(entry_type).to_value(), entry_type.as_str());
        }
    }
}
