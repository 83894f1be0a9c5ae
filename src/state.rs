use log::{debug, info};

use crate::edit::{collect_overrides, EditedRow};
use crate::error::Result;
use crate::loan::{build_schedule, LoanTerms, PaymentOverride, Schedule};

/// Events that trigger a full rebuild of the schedule.
#[derive(Clone, PartialEq, Debug)]
pub enum ScheduleEvent {
    /// New loan terms; previously applied edits are dropped.
    TermsChanged(LoanTerms),
    /// The user applied the payment grid.
    ApplyEdits(Vec<EditedRow>),
}

/// Current terms, the overrides in force, and the schedule they produce.
#[derive(Clone, PartialEq, Debug)]
pub struct ScheduleState {
    terms: LoanTerms,
    overrides: Option<PaymentOverride>,
    schedule: Schedule,
}

impl ScheduleState {
    pub fn new(terms: LoanTerms) -> Self {
        Self {
            terms,
            overrides: None,
            schedule: build_schedule(&terms, None, None),
        }
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn overrides(&self) -> Option<&PaymentOverride> {
        self.overrides.as_ref()
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }
}

/// Produce the state that follows `event`. On error `current` is still the
/// state in force.
pub fn recompute(current: &ScheduleState, event: ScheduleEvent) -> Result<ScheduleState> {
    match event {
        ScheduleEvent::TermsChanged(terms) => {
            info!("terms changed to {}", terms);
            Ok(ScheduleState::new(terms))
        }
        ScheduleEvent::ApplyEdits(rows) => {
            let overrides = collect_overrides(&rows)?;
            debug!("applying {} edited payments", overrides.payments.len());
            let schedule = build_schedule(
                &current.terms,
                Some(overrides.payments.as_slice()),
                Some(overrides.notes.as_slice()),
            );
            Ok(ScheduleState {
                terms: current.terms,
                overrides: Some(overrides),
                schedule,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{recompute, ScheduleEvent, ScheduleState};
    use crate::edit::EditedRow;
    use crate::error::LoanError;
    use crate::loan::{derive_payment_schedule_view, LoanTerms};
    use test_log::test;

    fn grid(state: &ScheduleState) -> Vec<EditedRow> {
        derive_payment_schedule_view(state.schedule())
            .into_iter()
            .map(|v| EditedRow::new(v.pmt_amount.to_string(), v.note))
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let state = ScheduleState::new(LoanTerms::new(100000., 7.25, 30., None));

        assert_eq!(state.schedule().get_pmt_count(), 360);
        assert!(state.overrides().is_none());
    }

    #[test]
    fn test_apply_edits_rebuilds_from_first_period() {
        let state = ScheduleState::new(LoanTerms::new(12000., 6., 1., None));
        let mut rows = grid(&state);
        rows[0] = EditedRow::new("5000", "windfall");
        rows[2] = EditedRow::new("0", "skip");

        let next = recompute(&state, ScheduleEvent::ApplyEdits(rows)).unwrap();
        let first = next.schedule().get_pmt_detail(1).unwrap();
        assert_eq!(first.pmt_amount, 5000.);
        assert_eq!(first.pmt_end_balance, 7060.);
        assert_eq!(first.note, "windfall");
        assert_eq!(next.schedule().get_pmt_detail(3).unwrap().pmt_amount, 0.);
        assert_eq!(next.schedule().final_balance(), 0.);
        assert_eq!(next.overrides().unwrap().payments[0], 5000.);

        // the old schedule is untouched
        assert_eq!(state.schedule().get_pmt_detail(1).unwrap().pmt_amount, 1032.8);
    }

    #[test]
    fn test_bad_edit_keeps_state() {
        let state = ScheduleState::new(LoanTerms::new(12000., 6., 1., None));
        let mut rows = grid(&state);
        rows[4].amount = "abc".to_string();

        let result = recompute(&state, ScheduleEvent::ApplyEdits(rows));
        assert!(matches!(result, Err(LoanError::Validation(_))));
        assert_eq!(state.schedule().get_pmt_count(), 12);
        assert!(state.overrides().is_none());
    }

    #[test]
    fn test_terms_change_drops_edits() {
        let state = ScheduleState::new(LoanTerms::new(12000., 6., 1., None));
        let mut rows = grid(&state);
        rows[1].amount = "0".to_string();
        let edited = recompute(&state, ScheduleEvent::ApplyEdits(rows)).unwrap();

        let terms = LoanTerms::new(24000., 6., 2., None);
        let next = recompute(&edited, ScheduleEvent::TermsChanged(terms)).unwrap();

        assert_eq!(next.terms(), &terms);
        assert!(next.overrides().is_none());
        assert_eq!(next.schedule().get_pmt_count(), 24);
        assert!(next.schedule().rows().iter().all(|r| r.pmt_amount > 0.));
    }
}
