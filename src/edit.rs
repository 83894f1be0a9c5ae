use log::debug;

use crate::error::{LoanError, Result};
use crate::loan::PaymentOverride;

/// Message shown when an edited amount is not a number.
pub const AMOUNT_NOT_NUMERIC: &str = "Amount values should be numbers.";

/// One row of the payment grid as the user left it. The amount is the raw
/// cell text; notes are taken verbatim.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct EditedRow {
    pub amount: String,
    pub note: String,
}

impl EditedRow {
    pub fn new(amount: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            note: note.into(),
        }
    }
}

/// Parse an edited payment cell.
pub fn coerce_edited_amount(raw_cell_value: &str) -> Result<f64> {
    match raw_cell_value.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(LoanError::Validation(format!(
            "{} Got {:?}",
            AMOUNT_NOT_NUMERIC, raw_cell_value
        ))),
    }
}

/// Turn a full grid of edits into payment overrides. The first bad cell
/// rejects the whole set.
pub fn collect_overrides(rows: &[EditedRow]) -> Result<PaymentOverride> {
    let mut payments = Vec::with_capacity(rows.len());
    let mut notes = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let amount = coerce_edited_amount(&row.amount).map_err(|e| match e {
            LoanError::Validation(msg) => {
                LoanError::Validation(format!("payment {}: {}", idx + 1, msg))
            }
            other => other,
        })?;
        payments.push(amount);
        notes.push(row.note.clone());
    }
    debug!("collected {} edited payments", payments.len());

    Ok(PaymentOverride::new(payments, notes))
}
