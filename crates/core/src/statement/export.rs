//! Customer balances report and its CSV rendering.

use std::io::Write;

use polyroll_shared::types::{Amount, format_amount_2dp, format_kg};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ExportError;

/// CSV header for the customer balances export.
pub const CUSTOMER_BALANCES_HEADER: &[&str] = &[
    "Company",
    "Contact",
    "Phone",
    "Material Balance (kg)",
    "Outstanding Amount",
];

/// One row of the customer balances report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerBalanceRow {
    /// Company name.
    pub company: String,
    /// Contact person.
    pub contact: String,
    /// Phone number.
    pub phone: String,
    /// Current material balance.
    pub material_balance_kg: Decimal,
    /// Σ outstanding of final orders.
    pub outstanding_amount: Amount,
}

/// Writes the report as CSV: kg to 3 decimals, amounts to 2 decimals.
///
/// # Errors
///
/// Returns `ExportError` if serialization or flushing fails.
pub fn write_customer_balances_csv<W: Write>(rows: &[CustomerBalanceRow], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(CUSTOMER_BALANCES_HEADER)?;
    for row in rows {
        csv.write_record([
            row.company.as_str(),
            row.contact.as_str(),
            row.phone.as_str(),
            format_kg(row.material_balance_kg).as_str(),
            format_amount_2dp(row.outstanding_amount).as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}
