//! Material balance calculations.
//!
//! Balances are never stored; they are the sum of ledger deltas up to a date.

use chrono::NaiveDate;
use polyroll_shared::types::to_weight_kg;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{MaterialLedgerEntry, Party};
use super::error::MaterialError;

/// Sum of `delta_kg` for the party's entries dated on or before `cutoff`.
#[must_use]
pub fn balance_as_of(entries: &[MaterialLedgerEntry], party: Party, cutoff: NaiveDate) -> Decimal {
    let total: Decimal = entries
        .iter()
        .filter(|e| e.is_owned_by(party) && e.date <= cutoff)
        .map(|e| e.delta_kg)
        .sum();
    to_weight_kg(total)
}

/// Material moved within a period. Both sides are magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodMovement {
    /// Sum of positive deltas.
    pub in_kg: Decimal,
    /// Magnitude of the sum of negative deltas.
    pub out_kg: Decimal,
}

impl PeriodMovement {
    /// Net change over the period.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.in_kg - self.out_kg
    }
}

/// Splits the party's movement within `[start, end]` into inflow and outflow.
///
/// # Errors
///
/// Returns `MaterialError::InvalidPeriod` if `start > end`.
pub fn period_movement(
    entries: &[MaterialLedgerEntry],
    party: Party,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PeriodMovement, MaterialError> {
    if start > end {
        return Err(MaterialError::InvalidPeriod { start, end });
    }

    let mut in_kg = Decimal::ZERO;
    let mut out_kg = Decimal::ZERO;
    for entry in entries
        .iter()
        .filter(|e| e.is_owned_by(party) && e.date >= start && e.date <= end)
    {
        if entry.delta_kg.is_sign_negative() {
            out_kg -= entry.delta_kg;
        } else {
            in_kg += entry.delta_kg;
        }
    }

    Ok(PeriodMovement {
        in_kg: to_weight_kg(in_kg),
        out_kg: to_weight_kg(out_kg),
    })
}

/// Material section of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSummary {
    /// Balance at the end of the day before the period.
    pub opening_kg: Decimal,
    /// Inflow during the period.
    pub in_kg: Decimal,
    /// Outflow during the period.
    pub out_kg: Decimal,
    /// `opening_kg + in_kg - out_kg`
    pub closing_kg: Decimal,
}

impl MaterialSummary {
    /// Builds the summary for `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `MaterialError::InvalidPeriod` if `start > end`.
    pub fn for_period(
        entries: &[MaterialLedgerEntry],
        party: Party,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, MaterialError> {
        let movement = period_movement(entries, party, start, end)?;
        let opening_kg = start
            .pred_opt()
            .map_or(Decimal::ZERO, |day_before| balance_as_of(entries, party, day_before));
        Ok(Self {
            opening_kg,
            in_kg: movement.in_kg,
            out_kg: movement.out_kg,
            closing_kg: to_weight_kg(opening_kg + movement.net()),
        })
    }
}
