//! Conversions between stored rows and core domain types.
//!
//! Storage keeps currency in whole units, weights in grams and rates in
//! hundredths; everything crossing into `polyroll_core` is a `Decimal` kg or rate.

use polyroll_core::balance::Customer;
use polyroll_core::material::{MaterialLedgerEntry, MaterialReceipt, Party};
use polyroll_core::orders::{Order, OrderRoll};
use polyroll_core::payables::SupplierPayment;
use polyroll_core::raw_material::{NormalizedTxn, RawMaterialTxn};
use polyroll_core::receivables::{Payment, PaymentAllocation};
use polyroll_shared::types::{
    AllocationId, CustomerId, LedgerEntryId, OrderId, OrderRollId, PaymentId, RawMaterialTxnId,
    ReceiptId, SupplierPaymentId, kg_from_grams, rate_from_hundredths,
};
use sea_orm::DbErr;
use uuid::Uuid;

use super::error::RepositoryError;
use crate::entities::{
    customers, material_ledger_entries, material_receipts, order_rolls, orders, payment_allocations,
    payments, raw_material_txns, sea_orm_active_enums::PartyKind, supplier_payments,
};

/// Splits a party into its stored columns.
pub(crate) fn party_columns(party: Party) -> (PartyKind, Option<Uuid>) {
    match party {
        Party::Customer(id) => (PartyKind::Customer, Some(id.into_inner())),
        Party::CompanyStock => (PartyKind::CompanyStock, None),
    }
}

/// Rebuilds a party from its stored columns.
pub(crate) fn party_from_columns(kind: PartyKind, customer_id: Option<Uuid>) -> Result<Party, RepositoryError> {
    match (kind, customer_id) {
        (PartyKind::Customer, Some(id)) => Ok(Party::Customer(CustomerId::from_uuid(id))),
        (PartyKind::CompanyStock, None) => Ok(Party::CompanyStock),
        (kind, customer_id) => Err(RepositoryError::Database(DbErr::Custom(format!(
            "inconsistent party columns: {kind:?} with customer {customer_id:?}"
        )))),
    }
}

/// Bag counts are stored as `INTEGER`.
pub(crate) fn bags_to_column(bags: u32) -> Result<i32, RepositoryError> {
    i32::try_from(bags).map_err(|_| RepositoryError::Database(DbErr::Custom(format!("bag count {bags} out of range"))))
}

pub(crate) fn bags_from_column(bags: i32) -> u32 {
    u32::try_from(bags).unwrap_or_default()
}

pub(crate) fn customer_from_model(m: &customers::Model) -> Customer {
    Customer {
        id: CustomerId::from_uuid(m.id),
        company_name: m.company_name.clone(),
        contact_name: m.contact_name.clone(),
        phone: m.phone.clone(),
        previous_pending_balance: m.previous_pending_balance,
        pending_balance: m.pending_balance,
        shortfall_enabled: m.shortfall_enabled,
        shortfall_rate_per_kg: m.shortfall_rate_hundredths.map(rate_from_hundredths),
    }
}

pub(crate) fn order_from_model(m: &orders::Model) -> Order {
    Order {
        id: OrderId::from_uuid(m.id),
        customer_id: CustomerId::from_uuid(m.customer_id),
        invoice_number: m.invoice_number.clone(),
        order_date: m.order_date,
        status: m.status.into(),
        target_total_kg: kg_from_grams(m.target_total_grams),
        produced_kg: kg_from_grams(m.produced_grams),
        price_per_kg: rate_from_hundredths(m.price_per_kg_hundredths),
        include_tax: m.include_tax,
        tolerance_kg: kg_from_grams(m.tolerance_grams),
        material_type: m.material_type.map(Into::into),
    }
}

pub(crate) fn roll_from_model(m: &order_rolls::Model) -> OrderRoll {
    OrderRoll {
        id: OrderRollId::from_uuid(m.id),
        order_id: OrderId::from_uuid(m.order_id),
        weight_kg: kg_from_grams(m.weight_grams),
    }
}

pub(crate) fn ledger_entry_from_model(m: &material_ledger_entries::Model) -> Result<MaterialLedgerEntry, RepositoryError> {
    Ok(MaterialLedgerEntry {
        id: LedgerEntryId::from_uuid(m.id),
        party: party_from_columns(m.party_kind, m.customer_id)?,
        entry_type: m.entry_type.into(),
        delta_kg: kg_from_grams(m.delta_grams),
        date: m.entry_date,
        material_type: m.material_type.map(Into::into),
        memo: m.memo.clone(),
        order_id: m.order_id.map(OrderId::from_uuid),
        receipt_id: m.receipt_id.map(ReceiptId::from_uuid),
        raw_txn_id: m.raw_txn_id.map(RawMaterialTxnId::from_uuid),
    })
}

pub(crate) fn receipt_from_model(m: &material_receipts::Model) -> MaterialReceipt {
    MaterialReceipt {
        id: ReceiptId::from_uuid(m.id),
        customer_id: CustomerId::from_uuid(m.customer_id),
        received_on: m.received_on,
        material_type: m.material_type.map(Into::into),
        bags_count: bags_from_column(m.bags_count),
        extra_kg: kg_from_grams(m.extra_grams),
        notes: m.notes.clone(),
        is_opening_adjustment: m.is_opening_adjustment,
    }
}

pub(crate) fn payment_from_model(m: &payments::Model) -> Payment {
    Payment {
        id: PaymentId::from_uuid(m.id),
        customer_id: CustomerId::from_uuid(m.customer_id),
        received_on: m.received_on,
        amount: m.amount,
        method: m.method.into(),
        reference: m.reference.clone(),
        notes: m.notes.clone(),
    }
}

pub(crate) fn allocation_from_model(m: &payment_allocations::Model) -> PaymentAllocation {
    PaymentAllocation {
        id: AllocationId::from_uuid(m.id),
        payment_id: PaymentId::from_uuid(m.payment_id),
        order_id: OrderId::from_uuid(m.order_id),
        amount: m.amount,
        rounding_adjustment: m.rounding_adjustment,
        applied_on: m.applied_on,
    }
}

pub(crate) fn raw_txn_from_model(m: &raw_material_txns::Model) -> Result<RawMaterialTxn, RepositoryError> {
    let from = match m.from_party_kind {
        Some(kind) => Some(party_from_columns(kind, m.from_customer_id)?),
        None => None,
    };
    Ok(RawMaterialTxn {
        id: RawMaterialTxnId::from_uuid(m.id),
        txn: NormalizedTxn {
            kind: m.kind.into(),
            txn_date: m.txn_date,
            supplier_name: m.supplier_name.clone(),
            from,
            to: party_from_columns(m.to_party_kind, m.to_customer_id)?,
            qty_kg: kg_from_grams(m.qty_grams),
            bags_count: bags_from_column(m.bags_count),
            rate: rate_from_hundredths(m.rate_hundredths),
            amount: m.amount,
            material_type: m.material_type.into(),
            dc_number: m.dc_number.clone(),
            memo: m.memo.clone(),
        },
    })
}

pub(crate) fn supplier_payment_from_model(m: &supplier_payments::Model) -> SupplierPayment {
    SupplierPayment {
        id: SupplierPaymentId::from_uuid(m.id),
        supplier_name: m.supplier_name.clone(),
        paid_on: m.paid_on,
        method: m.method.into(),
        bank: m.bank.clone(),
        reference: m.reference.clone(),
        amount: m.amount,
        notes: m.notes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_columns_round_trip() {
        let customer = Party::Customer(CustomerId::new());
        for party in [customer, Party::CompanyStock] {
            let (kind, id) = party_columns(party);
            assert_eq!(party_from_columns(kind, id).unwrap(), party);
        }
    }

    #[test]
    fn test_inconsistent_party_columns_rejected() {
        assert!(party_from_columns(PartyKind::Customer, None).is_err());
        assert!(party_from_columns(PartyKind::CompanyStock, Some(Uuid::nil())).is_err());
    }
}
