//! Raw-material transaction engine.
//!
//! Validates a transaction per kind, forces its endpoints, derives quantity and
//! commercial amount, and produces the ledger rows it owns.

use polyroll_shared::config::{AmountFormula, RawMaterialSettings};
use polyroll_shared::types::{
    Amount, RawMaterialTxnId, format_kg, normalize_rate, to_currency_int, to_weight_kg,
};
use rust_decimal::Decimal;

use super::error::RawMaterialError;
use super::types::{NormalizedTxn, RawMaterialTxnInput, TxnKind};
use crate::material::{LedgerPosting, LedgerSource, Party};

/// Display name of the company stock bucket.
pub const COMPANY_STOCK_NAME: &str = "Company Stock";

/// Raw-material transaction service.
///
/// Pure business logic; persistence applies the returned postings atomically.
pub struct RawMaterialService;

impl RawMaterialService {
    /// Validates and normalizes a transaction.
    ///
    /// 1. Quantity: `bags × bag_weight_kg` when bags are given, else `qty_kg`; must be positive
    /// 2. Endpoints per kind: PURCHASE `None → CompanyStock`, SALE `CompanyStock → to`,
    ///    TRANSFER `from → to` with `from != to`
    /// 3. Amount: configured formula for PURCHASE and SALE, explicit or zero for TRANSFER
    ///
    /// # Errors
    ///
    /// Returns `RawMaterialError` for an invalid quantity, rate, amount or endpoint.
    pub fn normalize(
        input: &RawMaterialTxnInput,
        settings: &RawMaterialSettings,
    ) -> Result<NormalizedTxn, RawMaterialError> {
        let qty_kg = Self::quantity(input, settings.bag_weight_kg)?;

        if input.rate.is_sign_negative() && !input.rate.is_zero() {
            return Err(RawMaterialError::NegativeRate);
        }
        let rate = normalize_rate(input.rate);

        let supplier_name = input.supplier_name.trim();
        let (supplier_name, from, to) = match input.kind {
            TxnKind::Purchase => {
                if supplier_name.is_empty() {
                    return Err(RawMaterialError::MissingSupplier);
                }
                (Some(supplier_name.to_string()), None, Party::CompanyStock)
            }
            TxnKind::Sale => {
                let to = input
                    .to_customer
                    .ok_or(RawMaterialError::MissingSaleCustomer)?;
                (None, Some(Party::CompanyStock), Party::Customer(to))
            }
            TxnKind::Transfer => {
                let (Some(from), Some(to)) = (input.from_customer, input.to_customer) else {
                    return Err(RawMaterialError::MissingTransferEndpoint);
                };
                if from == to {
                    return Err(RawMaterialError::SameTransferEndpoints);
                }
                (None, Some(Party::Customer(from)), Party::Customer(to))
            }
        };

        let amount = Self::amount(input.kind, qty_kg, rate, input.amount, settings)?;

        Ok(NormalizedTxn {
            kind: input.kind,
            txn_date: input.txn_date,
            supplier_name,
            from,
            to,
            qty_kg,
            bags_count: input.bags_count,
            rate,
            amount,
            material_type: input.material_type,
            dc_number: input.dc_number.trim().to_string(),
            memo: input.memo.trim().to_string(),
        })
    }

    fn quantity(input: &RawMaterialTxnInput, bag_weight_kg: Decimal) -> Result<Decimal, RawMaterialError> {
        let qty_kg = if input.bags_count > 0 {
            to_weight_kg(Decimal::from(input.bags_count) * bag_weight_kg)
        } else {
            to_weight_kg(input.qty_kg)
        };
        if qty_kg <= Decimal::ZERO {
            return Err(RawMaterialError::NonPositiveQuantity);
        }
        Ok(qty_kg)
    }

    /// Commercial value of a transaction in whole units.
    ///
    /// # Errors
    ///
    /// Returns `RawMaterialError::NegativeAmount` for a negative explicit transfer amount.
    pub fn amount(
        kind: TxnKind,
        qty_kg: Decimal,
        rate: Decimal,
        explicit: Option<Amount>,
        settings: &RawMaterialSettings,
    ) -> Result<Amount, RawMaterialError> {
        if !kind.is_commercial() {
            let amount = explicit.unwrap_or(0);
            if amount < 0 {
                return Err(RawMaterialError::NegativeAmount);
            }
            return Ok(amount);
        }

        let value = match settings.amount_formula {
            AmountFormula::PerKg => rate * qty_kg,
            AmountFormula::PerBag { multiplier } => {
                rate * (qty_kg / settings.bag_weight_kg) * multiplier
            }
        };
        Ok(to_currency_int(value))
    }
}

impl NormalizedTxn {
    /// Ledger rows owned by this transaction: one IN for a purchase, a
    /// mirrored OUT/IN pair for a sale or transfer.
    ///
    /// `party_name` resolves display names for memos.
    ///
    /// # Errors
    ///
    /// Returns `RawMaterialError::Material` if a posting cannot be built.
    pub fn postings<F>(&self, id: RawMaterialTxnId, party_name: F) -> Result<Vec<LedgerPosting>, RawMaterialError>
    where
        F: Fn(Party) -> String,
    {
        let source = LedgerSource::RawTxn(id);
        let qty = format_kg(self.qty_kg);
        let material = self.material_type;
        let inbound = |memo: String| {
            LedgerPosting::new(source, self.to, self.qty_kg, self.txn_date)
                .map(|p| p.with_material_type(Some(material)).with_memo(memo))
        };
        let outbound = |party: Party, memo: String| {
            LedgerPosting::new(source, party, -self.qty_kg, self.txn_date)
                .map(|p| p.with_material_type(Some(material)).with_memo(memo))
        };

        let postings = match (self.kind, self.from) {
            (TxnKind::Purchase, _) | (_, None) => {
                let supplier = self.supplier_name.as_deref().unwrap_or_default();
                vec![inbound(format!("Purchase from {supplier} - {material} · {qty} KG"))?]
            }
            (TxnKind::Sale, Some(from)) => vec![
                outbound(from, format!("Sale to {} - {material} · {qty} KG", party_name(self.to)))?,
                inbound(format!("From {COMPANY_STOCK_NAME} {qty} KG - {material}"))?,
            ],
            (TxnKind::Transfer, Some(from)) => vec![
                outbound(from, format!("Transfer → {} - {material} - {qty} KG", party_name(self.to)))?,
                inbound(format!("Transfer ← {} - {material} - {qty} KG", party_name(from)))?,
            ],
        };
        Ok(postings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{EntryType, MaterialKind};
    use chrono::NaiveDate;
    use polyroll_shared::types::CustomerId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn input(kind: TxnKind) -> RawMaterialTxnInput {
        RawMaterialTxnInput {
            kind,
            txn_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            supplier_name: "Lucky Polymers".to_string(),
            from_customer: None,
            to_customer: None,
            qty_kg: Decimal::ZERO,
            bags_count: 1,
            rate: dec!(52.75),
            amount: None,
            material_type: MaterialKind::Film,
            dc_number: String::new(),
            memo: String::new(),
        }
    }

    fn name(party: Party) -> String {
        match party {
            Party::CompanyStock => COMPANY_STOCK_NAME.to_string(),
            Party::Customer(_) => "Acme Bags".to_string(),
        }
    }

    #[test]
    fn test_purchase_forces_company_stock_and_prices_per_kg() {
        let mut purchase = input(TxnKind::Purchase);
        purchase.from_customer = Some(CustomerId::new());
        let txn = RawMaterialService::normalize(&purchase, &RawMaterialSettings::default()).unwrap();

        assert_eq!(txn.from, None);
        assert_eq!(txn.to, Party::CompanyStock);
        assert_eq!(txn.qty_kg.to_string(), "25.000");
        // 52.75 × 25 = 1318.75 -> 1319
        assert_eq!(txn.amount, 1319);
    }

    #[test]
    fn test_per_bag_formula() {
        let settings = RawMaterialSettings {
            amount_formula: AmountFormula::PerBag {
                multiplier: dec!(55),
            },
            ..RawMaterialSettings::default()
        };
        let mut purchase = input(TxnKind::Purchase);
        purchase.bags_count = 4;
        purchase.rate = dec!(3.5);
        let txn = RawMaterialService::normalize(&purchase, &settings).unwrap();
        // 3.5 × 4 bags × 55 = 770
        assert_eq!(txn.amount, 770);
    }

    #[test]
    fn test_explicit_kg_when_no_bags() {
        let mut sale = input(TxnKind::Sale);
        sale.bags_count = 0;
        sale.qty_kg = dec!(12.3456);
        sale.to_customer = Some(CustomerId::new());
        let txn = RawMaterialService::normalize(&sale, &RawMaterialSettings::default()).unwrap();
        assert_eq!(txn.qty_kg.to_string(), "12.346");
        assert_eq!(txn.from, Some(Party::CompanyStock));
    }

    #[rstest]
    #[case(TxnKind::Purchase, "", false, false, "MISSING_SUPPLIER")]
    #[case(TxnKind::Purchase, "   ", false, false, "MISSING_SUPPLIER")]
    #[case(TxnKind::Sale, "x", false, false, "MISSING_SALE_CUSTOMER")]
    #[case(TxnKind::Transfer, "x", true, false, "MISSING_TRANSFER_ENDPOINT")]
    #[case(TxnKind::Transfer, "x", true, true, "SAME_TRANSFER_ENDPOINTS")]
    fn test_endpoint_validation(
        #[case] kind: TxnKind,
        #[case] supplier: &str,
        #[case] has_from: bool,
        #[case] same_to: bool,
        #[case] code: &str,
    ) {
        let customer = CustomerId::new();
        let mut txn = input(kind);
        txn.supplier_name = supplier.to_string();
        txn.from_customer = has_from.then_some(customer);
        txn.to_customer = same_to.then_some(customer);
        let err = RawMaterialService::normalize(&txn, &RawMaterialSettings::default()).unwrap_err();
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut purchase = input(TxnKind::Purchase);
        purchase.bags_count = 0;
        let err = RawMaterialService::normalize(&purchase, &RawMaterialSettings::default()).unwrap_err();
        assert!(matches!(err, RawMaterialError::NonPositiveQuantity));
    }

    #[test]
    fn test_transfer_amount_defaults_to_zero() {
        let mut transfer = input(TxnKind::Transfer);
        transfer.from_customer = Some(CustomerId::new());
        transfer.to_customer = Some(CustomerId::new());
        let txn = RawMaterialService::normalize(&transfer, &RawMaterialSettings::default()).unwrap();
        assert_eq!(txn.amount, 0);

        transfer.amount = Some(-5);
        assert!(RawMaterialService::normalize(&transfer, &RawMaterialSettings::default()).is_err());
    }

    #[test]
    fn test_sale_postings_mirror_each_other() {
        let mut sale = input(TxnKind::Sale);
        let customer = CustomerId::new();
        sale.to_customer = Some(customer);
        let txn = RawMaterialService::normalize(&sale, &RawMaterialSettings::default()).unwrap();
        let postings = txn.postings(RawMaterialTxnId::new(), name).unwrap();

        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].party, Party::CompanyStock);
        assert_eq!(postings[0].key.entry_type, EntryType::Out);
        assert_eq!(postings[1].party, Party::Customer(customer));
        assert_eq!(postings[1].key.entry_type, EntryType::In);
        assert_eq!(postings[0].delta_kg + postings[1].delta_kg, Decimal::ZERO);
        assert_eq!(postings[0].memo, "Sale to Acme Bags - FILM · 25.000 KG");
    }

    #[test]
    fn test_purchase_posting() {
        let txn = RawMaterialService::normalize(&input(TxnKind::Purchase), &RawMaterialSettings::default())
            .unwrap();
        let postings = txn.postings(RawMaterialTxnId::new(), name).unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].party, Party::CompanyStock);
        assert_eq!(postings[0].delta_kg, dec!(25));
        assert_eq!(postings[0].memo, "Purchase from Lucky Polymers - FILM · 25.000 KG");
    }
}
