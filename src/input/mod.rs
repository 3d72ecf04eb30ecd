//! Retirement inputs, their validation, and the shareable link encoding

pub mod loader;
pub mod share;

pub use loader::{load_inputs, load_inputs_from_reader, LabelledInput};
pub use share::DEFAULT_BASE_ADDRESS;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CalculatorError, Result};
use crate::life_expectancy::{validate_birth_year, Longevity, Sex, MAX_AGE};

/// Everything the engine needs to project one retirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementInput {
    pub sex: Sex,
    pub longevity: Longevity,
    pub date_of_birth: NaiveDate,
    /// Extra years added to life expectancy when sizing the budget
    pub additional_longevity: f64,
    pub retirement_date: NaiveDate,
    pub starting_assets: f64,
    /// Annual superannuation (pension) income
    pub superannuation: f64,
    /// Annual interest rate as a decimal (0.05 for 5%)
    pub interest_rate: f64,
}

impl RetirementInput {
    pub fn birth_year(&self) -> i32 {
        self.date_of_birth.year()
    }

    /// The 95th birthday, after which the projection stops
    ///
    /// A 29 February birthday maps to 28 February when the target year is
    /// not a leap year.
    pub fn max_date(&self) -> Result<NaiveDate> {
        self.date_of_birth
            .checked_add_months(Months::new(MAX_AGE * 12))
            .ok_or_else(|| {
                CalculatorError::invalid("date of birth", self.date_of_birth, "is outside the supported calendar")
            })
    }

    /// Check every precondition of a projection
    pub fn validate(&self) -> Result<()> {
        validate_birth_year(self.birth_year())?;

        check_non_negative("additional longevity", self.additional_longevity)?;
        check_non_negative("starting assets", self.starting_assets)?;
        check_non_negative("superannuation", self.superannuation)?;

        if !self.interest_rate.is_finite() {
            return Err(CalculatorError::invalid("interest rate", self.interest_rate, "must be a number"));
        }
        if self.interest_rate <= -1.0 {
            return Err(CalculatorError::invalid(
                "interest rate",
                self.interest_rate,
                "must be greater than -100%",
            ));
        }

        if self.retirement_date < self.date_of_birth {
            return Err(CalculatorError::InvalidDateOrder {
                date: self.retirement_date,
                birth_date: self.date_of_birth,
            });
        }
        let max_date = self.max_date()?;
        if self.retirement_date > max_date {
            return Err(CalculatorError::invalid(
                "retirement date",
                self.retirement_date,
                format!("must be no later than the {}th birthday ({})", MAX_AGE, max_date),
            ));
        }

        Ok(())
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(CalculatorError::invalid(field, value, "must be a number"));
    }
    if value < 0.0 {
        return Err(CalculatorError::invalid(field, value, "must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Male, median, born 1960-01-01, retiring 2025-01-01 with $500k at 5%
    pub fn sample_input() -> RetirementInput {
        RetirementInput {
            sex: Sex::Male,
            longevity: Longevity::Median,
            date_of_birth: date(1960, 1, 1),
            additional_longevity: 0.0,
            retirement_date: date(2025, 1, 1),
            starting_assets: 500_000.0,
            superannuation: 0.0,
            interest_rate: 0.05,
        }
    }

    #[test]
    fn test_sample_input_is_valid() {
        assert!(sample_input().validate().is_ok());
    }

    #[test]
    fn test_max_date_is_95th_birthday() {
        assert_eq!(sample_input().max_date().unwrap(), date(2055, 1, 1));

        let leap = RetirementInput {
            date_of_birth: date(1960, 2, 29),
            ..sample_input()
        };
        assert_eq!(leap.max_date().unwrap(), date(2055, 2, 28));
    }

    #[test]
    fn test_retirement_before_birth_is_date_order_error() {
        let input = RetirementInput {
            retirement_date: date(1959, 6, 1),
            ..sample_input()
        };
        assert!(matches!(
            input.validate(),
            Err(CalculatorError::InvalidDateOrder { .. })
        ));
    }

    #[test]
    fn test_retirement_after_horizon_is_rejected() {
        let at_horizon = RetirementInput {
            retirement_date: date(2055, 1, 1),
            ..sample_input()
        };
        assert!(at_horizon.validate().is_ok());

        let past_horizon = RetirementInput {
            retirement_date: date(2055, 1, 2),
            ..sample_input()
        };
        assert!(matches!(
            past_horizon.validate(),
            Err(CalculatorError::InvalidInput { field: "retirement date", .. })
        ));
    }

    #[test]
    fn test_rejects_negative_and_non_finite_amounts() {
        let cases = [
            RetirementInput { starting_assets: -1.0, ..sample_input() },
            RetirementInput { superannuation: f64::NAN, ..sample_input() },
            RetirementInput { additional_longevity: -0.5, ..sample_input() },
            RetirementInput { interest_rate: f64::INFINITY, ..sample_input() },
            RetirementInput { interest_rate: -1.0, ..sample_input() },
        ];
        for input in cases {
            assert!(
                matches!(input.validate(), Err(CalculatorError::InvalidInput { .. })),
                "{:?}",
                input
            );
        }

        let negative_rate = RetirementInput { interest_rate: -0.02, ..sample_input() };
        assert!(negative_rate.validate().is_ok());
    }

    #[test]
    fn test_rejects_birth_years_outside_tables() {
        let early = RetirementInput {
            date_of_birth: date(1875, 12, 31),
            retirement_date: date(1940, 1, 1),
            ..sample_input()
        };
        assert!(matches!(
            early.validate(),
            Err(CalculatorError::InvalidInput { field: "birth year", .. })
        ));

        let late = RetirementInput {
            date_of_birth: date(2017, 1, 1),
            retirement_date: date(2080, 1, 1),
            ..sample_input()
        };
        assert!(late.validate().is_err());
    }
}
