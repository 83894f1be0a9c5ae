use chrono::{Datelike, Months, NaiveDate};
use log::{debug, trace, warn};
use std::fmt;

use crate::error::{LoanError, Result};

/// Monetary fields of a schedule are kept to cents.
pub const DEC_PLACES: f64 = 2.;

/// Longest schedule accepted from user input, 100 years of monthly payments.
pub const MAX_PMT_COUNT: usize = 1200;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LoanTerms {
    pub principal: f64,
    pub annual_rate: f64, // annual nominal rate as a percent (i.e., 7.25)
    pub term: f64,        // term of loan in years, may be fractional
    pub start_date: Option<NaiveDate>,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate: f64, term: f64, start_date: Option<NaiveDate>) -> Self {
        Self {
            principal,
            annual_rate,
            term,
            start_date,
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12. / 100.
    }

    /// Number of monthly payments, `round(term * 12)`.
    pub fn pmt_count(&self) -> usize {
        // negative and NaN terms saturate to zero payments
        (self.term * 12.).round() as usize
    }

    /// Reject terms an input form would not accept: a positive amount, a
    /// non-negative rate, and a term of 1 to `MAX_PMT_COUNT` monthly payments.
    pub fn validate(&self) -> Result<()> {
        if !(self.principal.is_finite() && self.principal > 0.) {
            return Err(LoanError::Validation(format!(
                "amount financed must be a positive number, got {}",
                self.principal
            )));
        }
        if !(self.annual_rate.is_finite() && self.annual_rate >= 0.) {
            return Err(LoanError::Validation(format!(
                "interest rate must be zero or more, got {}",
                self.annual_rate
            )));
        }
        if !(self.term.is_finite() && self.term > 0.) {
            return Err(LoanError::Validation(format!(
                "term must be a positive number of years, got {}",
                self.term
            )));
        }
        let pmt_count = self.pmt_count();
        if pmt_count == 0 || pmt_count > MAX_PMT_COUNT {
            return Err(LoanError::Validation(format!(
                "term of {} years gives {} payments, expected 1 to {}",
                self.term, pmt_count, MAX_PMT_COUNT
            )));
        }
        Ok(())
    }
}

impl fmt::Display for LoanTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "principal ${:.2}, rate {}%, term {} years",
            self.principal, self.annual_rate, self.term
        )?;
        if let Some(start_date) = self.start_date {
            write!(f, ", starting {}", start_date)?;
        }
        Ok(())
    }
}

/// User supplied payment amounts and notes, one entry per period.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Debug, Default)]
pub struct PaymentOverride {
    pub payments: Vec<f64>,
    pub notes: Vec<String>,
}

impl PaymentOverride {
    pub fn new(payments: Vec<f64>, notes: Vec<String>) -> Self {
        Self { payments, notes }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Debug)]
pub struct ScheduleRow {
    pub pmt_number: usize,
    pub pmt_date: Option<NaiveDate>,
    pub pmt_amount: f64,
    pub pmt_principal_paid: f64,
    pub pmt_interest_paid: f64,
    pub pmt_end_balance: f64,
    pub note: String,
}

impl ScheduleRow {
    pub fn new(
        pmt_number: usize,
        pmt_date: Option<NaiveDate>,
        pmt_amount: f64,
        pmt_principal_paid: f64,
        pmt_interest_paid: f64,
        pmt_end_balance: f64,
        note: String,
    ) -> Self {
        Self {
            pmt_number,
            pmt_date,
            pmt_amount,
            pmt_principal_paid,
            pmt_interest_paid,
            pmt_end_balance,
            note,
        }
    }
}

impl fmt::Display for ScheduleRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pmt number {}", self.pmt_number)?;
        if let Some(pmt_date) = self.pmt_date {
            write!(f, ", date {}", pmt_date)?;
        }
        write!(
            f,
            ", payment ${:.2}, principal paid ${:.2}, interest paid ${:.2}, ending balance ${:.2}",
            self.pmt_amount, self.pmt_principal_paid, self.pmt_interest_paid, self.pmt_end_balance
        )?;
        if !self.note.is_empty() {
            write!(f, ", note {:?}", self.note)?;
        }
        Ok(())
    }
}

/// The editable slice of a row: what the payment grid shows.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Debug)]
pub struct PaymentView {
    pub pmt_number: usize,
    pub pmt_date: Option<NaiveDate>,
    pub pmt_amount: f64,
    pub note: String,
}

/// A complete amortization schedule. Never patched; a rebuild replaces it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Schedule {
    rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn get_pmt_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a 1-based payment number.
    pub fn get_pmt_detail(&self, pmt_number: usize) -> Option<&ScheduleRow> {
        pmt_number
            .checked_sub(1)
            .and_then(|idx| self.rows.get(idx))
    }

    pub fn get_pmt_info(&self, pmt_number: usize) -> String {
        match self.get_pmt_detail(pmt_number) {
            Some(row) => row.to_string(),
            None => "No payment information.".to_string(),
        }
    }

    pub fn final_balance(&self) -> f64 {
        self.rows.last().map_or(0., |row| row.pmt_end_balance)
    }
}

/// Money flows of a single period before rounding.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub(crate) struct PeriodFlow {
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
}

pub(crate) fn round(amt: f64, dec: f64) -> f64 {
    let factor = 10_f64.powf(dec);
    let rounded = (amt * factor).round() / factor;
    // keep -0.00 out of the tables
    if rounded == 0. {
        0.
    } else {
        rounded
    }
}

/// Level (annuity) payment that retires `principal` over `pmt_count` months.
///
/// A zero rate falls back to straight-line repayment. Zero periods, or a
/// rate with no finite payment, have no defined payment.
pub fn compute_level_payment(principal: f64, monthly_rate: f64, pmt_count: usize) -> Result<f64> {
    if pmt_count == 0 {
        return Err(LoanError::UndefinedResult(
            "level payment over zero periods",
        ));
    }
    let pmt = level_payment(principal, monthly_rate, pmt_count);
    if !pmt.is_finite() {
        return Err(LoanError::UndefinedResult(
            "level payment is not a finite amount",
        ));
    }
    Ok(pmt)
}

fn level_payment(principal: f64, monthly_rate: f64, pmt_count: usize) -> f64 {
    if monthly_rate == 0. {
        return principal / pmt_count as f64;
    }
    // r / (1 - (1+r)^-n) is the annuity factor without the inf/inf of long terms
    let discount = (1. + monthly_rate).powf(-(pmt_count as f64));
    principal * monthly_rate / (1. - discount)
}

/// Advance one period from `begin_balance`, returning the ending balance and
/// what was paid.
pub(crate) fn step(
    begin_balance: f64,
    monthly_rate: f64,
    requested_pmt: f64,
    is_last: bool,
) -> (f64, PeriodFlow) {
    if begin_balance == 0. {
        return (0., PeriodFlow::default());
    }

    let interest = begin_balance * monthly_rate;

    if is_last {
        // the final period always retires whatever is left
        let payment = begin_balance + interest;
        let principal = payment - interest;
        let end_balance = (begin_balance - principal).max(0.);
        (end_balance, PeriodFlow { payment, principal, interest })
    } else if requested_pmt == 0. {
        // skipped payment: interest capitalises into the balance
        (begin_balance + interest, PeriodFlow::default())
    } else {
        let principal = requested_pmt - interest;
        let end_balance = (begin_balance - principal).max(0.);
        (
            end_balance,
            PeriodFlow {
                payment: requested_pmt,
                principal,
                interest,
            },
        )
    }
}

/// Payment dates fall on the 1st of each month, starting the month after
/// `start_date`.
fn get_pmt_date(start_date: &NaiveDate, pmt_number: usize) -> Option<NaiveDate> {
    let months = u32::try_from(pmt_number).ok()?;
    start_date
        .with_day(1)?
        .checked_add_months(Months::new(months))
}

/// Build the full schedule for `terms`.
///
/// Without `payments` every period uses the level payment; without `notes`
/// every note is empty. Entries missing from a short override fall back the
/// same way.
pub fn build_schedule(
    terms: &LoanTerms,
    payments: Option<&[f64]>,
    notes: Option<&[String]>,
) -> Schedule {
    let pmt_count = terms.pmt_count();
    let monthly_rate = terms.monthly_rate();

    if pmt_count == 0 {
        debug!("{} has no payment periods", terms);
        return Schedule::default();
    }

    let level_pmt = level_payment(terms.principal, monthly_rate, pmt_count);
    debug!(
        "building {} periods for {}, level payment {:.4}",
        pmt_count, terms, level_pmt
    );

    if let Some(payments) = payments {
        if payments.len() != pmt_count {
            warn!(
                "{} payment overrides supplied for {} periods",
                payments.len(),
                pmt_count
            );
        }
    }
    if let Some(notes) = notes {
        if notes.len() != pmt_count {
            warn!("{} notes supplied for {} periods", notes.len(), pmt_count);
        }
    }

    let (_, rows) = (1..=pmt_count).fold(
        (terms.principal, Vec::with_capacity(pmt_count)),
        |(begin_balance, mut rows), pmt_number| {
            let requested_pmt = payments
                .and_then(|p| p.get(pmt_number - 1))
                .copied()
                .unwrap_or(level_pmt);
            let note = notes
                .and_then(|n| n.get(pmt_number - 1))
                .cloned()
                .unwrap_or_default();

            let (end_balance, flow) =
                step(begin_balance, monthly_rate, requested_pmt, pmt_number == pmt_count);
            trace!(
                "Pmt # {}, requested {}, interest {}, end bal {}",
                pmt_number,
                requested_pmt,
                flow.interest,
                end_balance
            );

            rows.push(ScheduleRow::new(
                pmt_number,
                terms
                    .start_date
                    .and_then(|start_date| get_pmt_date(&start_date, pmt_number)),
                round(flow.payment, DEC_PLACES),
                round(flow.principal, DEC_PLACES),
                round(flow.interest, DEC_PLACES),
                round(end_balance, DEC_PLACES),
                note,
            ));
            (end_balance, rows)
        },
    );

    Schedule { rows }
}

/// Column projection used by the editable payment grid.
pub fn derive_payment_schedule_view(schedule: &Schedule) -> Vec<PaymentView> {
    schedule
        .rows()
        .iter()
        .map(|row| PaymentView {
            pmt_number: row.pmt_number,
            pmt_date: row.pmt_date,
            pmt_amount: row.pmt_amount,
            note: row.note.clone(),
        })
        .collect()
}
