//! Customer-supplied material receipts.

use chrono::NaiveDate;
use polyroll_shared::types::{CustomerId, ReceiptId, to_weight_kg};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{EntryType, LedgerKey, LedgerPosting, LedgerSource, MaterialKind, Party};
use super::error::MaterialError;
use super::sync::SyncAction;

/// Material a customer sent in, counted in bags plus loose kg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialReceipt {
    /// Receipt id.
    pub id: ReceiptId,
    /// Customer who sent the material.
    pub customer_id: CustomerId,
    /// Date the material arrived.
    pub received_on: NaiveDate,
    /// Optional category tag.
    pub material_type: Option<MaterialKind>,
    /// Whole bags received.
    pub bags_count: u32,
    /// Loose kg on top of the bags (negative for corrections).
    pub extra_kg: Decimal,
    /// Free-text notes, copied to the ledger memo.
    pub notes: String,
    /// Opening balance or correction; may be negative.
    pub is_opening_adjustment: bool,
}

impl MaterialReceipt {
    /// `bags_count × bag_weight_kg + extra_kg`
    #[must_use]
    pub fn total_kg(&self, bag_weight_kg: Decimal) -> Decimal {
        to_weight_kg(Decimal::from(self.bags_count) * bag_weight_kg + self.extra_kg)
    }

    /// Validates the total and returns it.
    ///
    /// # Errors
    ///
    /// A regular receipt must be positive; an opening adjustment must be non-zero.
    pub fn validate(&self, bag_weight_kg: Decimal) -> Result<Decimal, MaterialError> {
        let total_kg = self.total_kg(bag_weight_kg);
        if self.is_opening_adjustment {
            if total_kg.is_zero() {
                return Err(MaterialError::ZeroAdjustment);
            }
        } else if total_kg <= Decimal::ZERO {
            return Err(MaterialError::ReceiptNotPositive { total_kg });
        }
        Ok(total_kg)
    }
}

/// The single ledger row of a receipt: IN when the total is positive, OUT when
/// negative, removed when zero.
pub fn receipt_sync(receipt: &MaterialReceipt, bag_weight_kg: Decimal) -> Result<SyncAction, MaterialError> {
    let total_kg = receipt.total_kg(bag_weight_kg);
    let source = LedgerSource::Receipt(receipt.id);
    if total_kg.is_zero() {
        return Ok(SyncAction::Remove(LedgerKey {
            source,
            entry_type: EntryType::In,
        }));
    }

    let posting = LedgerPosting::new(
        source,
        Party::Customer(receipt.customer_id),
        total_kg,
        receipt.received_on,
    )?
    .with_material_type(receipt.material_type)
    .with_memo(receipt.notes.trim());

    Ok(SyncAction::Upsert(posting))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn receipt(bags_count: u32, extra_kg: Decimal, is_opening_adjustment: bool) -> MaterialReceipt {
        MaterialReceipt {
            id: ReceiptId::new(),
            customer_id: CustomerId::new(),
            received_on: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
            material_type: Some(MaterialKind::Film),
            bags_count,
            extra_kg,
            notes: "  truck 7 ".to_string(),
            is_opening_adjustment,
        }
    }

    #[test]
    fn test_total_kg() {
        assert_eq!(receipt(4, dec!(12.5), false).total_kg(dec!(25)), dec!(112.500));
    }

    #[rstest]
    #[case(0, dec!(0), false, false)]
    #[case(0, dec!(-5), false, false)]
    #[case(1, dec!(0), false, true)]
    #[case(0, dec!(0), true, false)]
    #[case(0, dec!(-40), true, true)]
    fn test_validate(
        #[case] bags: u32,
        #[case] extra: Decimal,
        #[case] adjustment: bool,
        #[case] ok: bool,
    ) {
        assert_eq!(receipt(bags, extra, adjustment).validate(dec!(25)).is_ok(), ok);
    }

    #[test]
    fn test_positive_receipt_posts_in() {
        let r = receipt(2, Decimal::ZERO, false);
        let SyncAction::Upsert(posting) = receipt_sync(&r, dec!(25)).unwrap() else {
            panic!("expected upsert");
        };
        assert_eq!(posting.key.entry_type, EntryType::In);
        assert_eq!(posting.delta_kg, dec!(50));
        assert_eq!(posting.date, r.received_on);
        assert_eq!(posting.memo, "truck 7");
        assert_eq!(posting.material_type, Some(MaterialKind::Film));
    }

    #[test]
    fn test_negative_adjustment_posts_out() {
        let r = receipt(0, dec!(-40), true);
        let SyncAction::Upsert(posting) = receipt_sync(&r, dec!(25)).unwrap() else {
            panic!("expected upsert");
        };
        assert_eq!(posting.key.entry_type, EntryType::Out);
        assert_eq!(posting.delta_kg, dec!(-40));
    }

    #[test]
    fn test_zero_total_removes_row() {
        let r = receipt(0, Decimal::ZERO, true);
        assert!(matches!(receipt_sync(&r, dec!(25)).unwrap(), SyncAction::Remove(_)));
    }
}
