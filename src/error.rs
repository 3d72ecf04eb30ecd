//! Error taxonomy for the calculator
//!
//! User-correctable problems (`InvalidInput`, `InvalidDateOrder`) are kept
//! apart from data problems (`DataLoad`, `DataUnavailable`, `IterationLimit`),
//! which abort the run and are never the caller's fault.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalculatorError {
    /// A value supplied by the caller is outside its allowed domain
    #[error("invalid {field} `{value}`: {reason}")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A date falls before the date of birth
    #[error("{date} occurs before date of birth {birth_date}")]
    InvalidDateOrder {
        date: NaiveDate,
        birth_date: NaiveDate,
    },

    /// A life expectancy table could not be read or parsed
    #[error("failed to load life expectancy table {table}: {reason}")]
    DataLoad { table: String, reason: String },

    /// A validated lookup did not resolve to a loaded row
    #[error("no life expectancy data in {table} for birth year {birth_year} at age {age}")]
    DataUnavailable {
        table: String,
        birth_year: i32,
        age: u32,
    },

    /// The simulation ran past the number of days a 95-year horizon can hold
    #[error("simulation exceeded {days} days without terminating")]
    IterationLimit { days: u32 },
}

impl CalculatorError {
    pub(crate) fn invalid(field: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        CalculatorError::InvalidInput {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn data_load(table: impl Into<String>, reason: impl ToString) -> Self {
        CalculatorError::DataLoad {
            table: table.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the caller can fix this by changing their inputs
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CalculatorError::InvalidInput { .. } | CalculatorError::InvalidDateOrder { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CalculatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_distinguished() {
        let bad_year = CalculatorError::invalid("birth year", 1800, "must be no earlier than 1876");
        assert!(bad_year.is_user_error());
        assert_eq!(
            bad_year.to_string(),
            "invalid birth year `1800`: must be no earlier than 1876"
        );

        let missing = CalculatorError::data_load("male-median.csv", "file not found");
        assert!(!missing.is_user_error());

        let unavailable = CalculatorError::DataUnavailable {
            table: "female-median".to_string(),
            birth_year: 2016,
            age: 40,
        };
        assert!(!unavailable.is_user_error());
    }
}
