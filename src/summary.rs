use log::debug;
use std::fmt;

use crate::error::{LoanError, Result};
use crate::loan::{round, Schedule, DEC_PLACES};

/// Sum of every payment in the schedule.
pub fn calculate_total_paid(schedule: &Schedule) -> f64 {
    round(
        schedule.rows().iter().map(|row| row.pmt_amount).sum(),
        DEC_PLACES,
    )
}

/// Interest paid over the life of the loan. Negative when the schedule pays
/// back less than was borrowed.
pub fn calculate_interest_amount(principal: f64, total_paid: f64) -> f64 {
    round(total_paid - principal, DEC_PLACES)
}

/// Share of `total_paid` that went to interest, as a whole percent.
pub fn calculate_percent_interest(principal: f64, total_paid: f64) -> Result<i64> {
    if total_paid == 0. {
        return Err(LoanError::UndefinedResult(
            "percent interest with nothing paid",
        ));
    }
    let percent = (total_paid - principal) / total_paid * 100.;
    if !percent.is_finite() {
        return Err(LoanError::UndefinedResult(
            "percent interest of a non-finite amount",
        ));
    }
    Ok(percent.round_ties_even() as i64)
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ScheduleSummary {
    pub total_paid: f64,
    pub interest_paid: f64,
    pub percent_interest: Option<i64>, // None when nothing was paid
}

impl ScheduleSummary {
    pub fn new(principal: f64, schedule: &Schedule) -> Self {
        let total_paid = calculate_total_paid(schedule);
        let percent_interest = match calculate_percent_interest(principal, total_paid) {
            Ok(percent) => Some(percent),
            Err(e) => {
                debug!("{}", e);
                None
            }
        };
        Self {
            total_paid,
            interest_paid: calculate_interest_amount(principal, total_paid),
            percent_interest,
        }
    }
}

impl fmt::Display for ScheduleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total paid ${:.2}, interest paid ${:.2}, percent interest ",
            self.total_paid, self.interest_paid
        )?;
        match self.percent_interest {
            Some(percent) => write!(f, "{}%", percent),
            None => write!(f, "n/a"),
        }
    }
}

/// Running totals of principal and interest through each payment.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CumulativeAmount {
    pub pmt_number: usize,
    pub cumulative_principal: f64,
    pub cumulative_interest: f64,
}

pub fn cumulative_amounts(schedule: &Schedule) -> Vec<CumulativeAmount> {
    schedule
        .rows()
        .iter()
        .scan((0., 0.), |(principal, interest), row| {
            *principal += row.pmt_principal_paid;
            *interest += row.pmt_interest_paid;
            Some(CumulativeAmount {
                pmt_number: row.pmt_number,
                cumulative_principal: round(*principal, DEC_PLACES),
                cumulative_interest: round(*interest, DEC_PLACES),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        calculate_interest_amount, calculate_percent_interest, calculate_total_paid,
        cumulative_amounts, ScheduleSummary,
    };
    use crate::error::LoanError;
    use crate::loan::{build_schedule, LoanTerms};
    use approx::assert_abs_diff_eq;
    use test_log::test;

    #[test]
    fn test_interest_amount() {
        assert_eq!(calculate_interest_amount(100000., 150000.), 50000.);
        assert_eq!(calculate_interest_amount(100000., 90000.), -10000.);
        assert_eq!(calculate_interest_amount(1000., 1000.004), 0.);
    }

    #[test]
    fn test_percent_interest() {
        assert_eq!(calculate_percent_interest(100000., 150000.).unwrap(), 33);
        assert_eq!(calculate_percent_interest(100000., 100000.).unwrap(), 0);
        assert_eq!(calculate_percent_interest(100000., 90000.).unwrap(), -11);
        // halves round to even
        assert_eq!(calculate_percent_interest(50., 400.).unwrap(), 88);
        assert_eq!(calculate_percent_interest(300., 800.).unwrap(), 62);
        assert!(matches!(
            calculate_percent_interest(100000., 0.),
            Err(LoanError::UndefinedResult(_))
        ));
        for total_paid in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                calculate_percent_interest(100000., total_paid),
                Err(LoanError::UndefinedResult(_))
            ));
        }
        assert!(matches!(
            calculate_percent_interest(f64::NAN, 150000.),
            Err(LoanError::UndefinedResult(_))
        ));
    }

    #[test]
    fn test_mortgage_summary() {
        let schedule = build_schedule(&LoanTerms::new(100000., 7.25, 30., None), None, None);

        assert_eq!(calculate_total_paid(&schedule), 245584.8);

        let summary = ScheduleSummary::new(100000., &schedule);
        assert_eq!(summary.total_paid, 245584.8);
        assert_eq!(summary.interest_paid, 145584.8);
        assert_eq!(summary.percent_interest, Some(59));
        assert_eq!(
            summary.to_string(),
            "total paid $245584.80, interest paid $145584.80, percent interest 59%"
        );
    }

    #[test]
    fn test_empty_summary() {
        let schedule = build_schedule(&LoanTerms::new(100000., 7.25, 0., None), None, None);
        let summary = ScheduleSummary::new(100000., &schedule);

        assert_eq!(summary.total_paid, 0.);
        assert_eq!(summary.interest_paid, -100000.);
        assert_eq!(summary.percent_interest, None);
        assert!(summary.to_string().ends_with("percent interest n/a"));
    }

    #[test]
    fn test_cumulative_amounts() {
        let schedule = build_schedule(&LoanTerms::new(12000., 6., 1., None), None, None);
        let cumulative = cumulative_amounts(&schedule);

        assert_eq!(cumulative.len(), 12);
        assert_eq!(cumulative[0].cumulative_principal, 972.8);
        assert_eq!(cumulative[0].cumulative_interest, 60.);
        assert_eq!(cumulative[1].cumulative_interest, 115.14);

        let last = cumulative.last().unwrap();
        assert_eq!(last.pmt_number, 12);
        assert_abs_diff_eq!(last.cumulative_principal, 12000., epsilon = 0.1);
        assert_abs_diff_eq!(
            last.cumulative_principal + last.cumulative_interest,
            calculate_total_paid(&schedule),
            epsilon = 0.15
        );
    }
}
