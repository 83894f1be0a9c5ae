//! Loan amortization schedules with user-edited payments.
//!
//! - [`loan`]: loan terms, the amortization engine and the payment grid view
//! - [`summary`]: totals and running amounts derived from a schedule
//! - [`edit`]: validation of edited payment cells
//! - [`state`]: rebuilding the schedule in response to events
//! - [`export`]: CSV export and import of edited payments

pub mod edit;
pub mod error;
pub mod export;
pub mod loan;
pub mod state;
pub mod summary;

pub use error::{LoanError, Result};
pub use loan::{
    build_schedule, compute_level_payment, derive_payment_schedule_view, LoanTerms,
    PaymentOverride, PaymentView, Schedule, ScheduleRow,
};
pub use state::{recompute, ScheduleEvent, ScheduleState};
pub use summary::{
    calculate_interest_amount, calculate_percent_interest, calculate_total_paid,
    cumulative_amounts, ScheduleSummary,
};
