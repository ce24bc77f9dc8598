//! Statement/period arithmetic and the customer balances export.
//!
//! A statement reconstructs opening balance, period charges, payments and
//! closing balance from the ledgers; its closing always equals the pending
//! balance computed directly for the period end.

pub mod error;
pub mod export;
pub mod period;

#[cfg(test)]
mod statement_props;

pub use error::{ExportError, StatementError};
pub use export::{CUSTOMER_BALANCES_HEADER, CustomerBalanceRow, write_customer_balances_csv};
pub use period::{PeriodStatement, StatementMaterialLine, StatementOrderLine, SurchargeLine};
