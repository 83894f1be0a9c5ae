//! Delimited text export of schedules, and import of edited payment grids.
//!
//! Amounts are written with two decimals. The date column is blank when the
//! loan has no start date.

use chrono::NaiveDate;
use csv::{Reader, StringRecord, Writer};
use log::debug;
use std::io;

use crate::edit::EditedRow;
use crate::error::{LoanError, Result};
use crate::loan::{PaymentView, Schedule};

pub const SCHEDULE_HEADERS: [&str; 7] = [
    "Payment",
    "Date",
    "Amount",
    "Principal Payment",
    "Interest Payment",
    "Remaining Balance",
    "Notes",
];

pub const PAYMENT_VIEW_HEADERS: [&str; 4] = ["Payment", "Date", "Amount", "Notes"];

fn format_date(pmt_date: Option<NaiveDate>) -> String {
    pmt_date.map(|d| d.to_string()).unwrap_or_default()
}

fn format_money(amt: f64) -> String {
    format!("{:.2}", amt)
}

/// Write every column of the schedule.
pub fn write_schedule_csv<W: io::Write>(schedule: &Schedule, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(SCHEDULE_HEADERS)?;

    for row in schedule.rows() {
        wtr.write_record([
            row.pmt_number.to_string(),
            format_date(row.pmt_date),
            format_money(row.pmt_amount),
            format_money(row.pmt_principal_paid),
            format_money(row.pmt_interest_paid),
            format_money(row.pmt_end_balance),
            row.note.clone(),
        ])?;
    }
    wtr.flush()?;
    debug!("wrote {} schedule rows", schedule.get_pmt_count());
    Ok(())
}

/// Write the editable payment grid.
pub fn write_payment_view_csv<W: io::Write>(view: &[PaymentView], writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(PAYMENT_VIEW_HEADERS)?;

    for pmt in view {
        wtr.write_record([
            pmt.pmt_number.to_string(),
            format_date(pmt.pmt_date),
            format_money(pmt.pmt_amount),
            pmt.note.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Read edited grid rows from a CSV with an `Amount` column and an optional
/// `Notes` column. Both exports above are accepted. Amount cells are left
/// as raw text for validation by the caller.
pub fn read_edited_rows<R: io::Read>(reader: R) -> Result<Vec<EditedRow>> {
    let mut rdr = Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let amount_col = column_index(&headers, "Amount").ok_or_else(|| {
        LoanError::Validation("edited payments have no Amount column".to_string())
    })?;
    let notes_col = column_index(&headers, "Notes");

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(EditedRow::new(
            record.get(amount_col).unwrap_or_default(),
            notes_col
                .and_then(|idx| record.get(idx))
                .unwrap_or_default(),
        ));
    }
    debug!("read {} edited rows", rows.len());
    Ok(rows)
}
