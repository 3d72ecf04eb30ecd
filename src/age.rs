//! Calendar-correct age between two dates
//!
//! Age is counted in completed birthdays plus the days since the last one,
//! with the fraction taken over the actual length of the current age-year
//! (365 or 366 days). Budget sizing uses a separate 365.25-day convention;
//! the two are not interchangeable.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CalculatorError, Result};

/// Age at a given date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Age {
    /// Completed years
    pub years: u32,
    /// Days since the most recent birthday
    pub days: u32,
    /// Days from the most recent birthday to the next one
    pub days_in_year: u32,
    /// `years + days / days_in_year`
    pub value: f64,
}

impl fmt::Display for Age {
    /// "65 years", or "65 years 12 days" part way through an age-year
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} years", self.years)?;
        if self.days != 0 {
            write!(f, " {} days", self.days)?;
        }
        Ok(())
    }
}

/// Birthday anniversary of `birth_date` in `year`
///
/// A 29 February birthday falls on 1 March in non-leap years.
pub fn anniversary(birth_date: NaiveDate, year: i32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, birth_date.month(), birth_date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .ok_or_else(|| CalculatorError::invalid("date", year, "year is outside the supported calendar"))
}

/// Age on `as_of` for someone born on `birth_date`
pub fn age_at(as_of: NaiveDate, birth_date: NaiveDate) -> Result<Age> {
    if as_of < birth_date {
        return Err(CalculatorError::InvalidDateOrder {
            date: as_of,
            birth_date,
        });
    }

    let this_year = anniversary(birth_date, as_of.year())?;
    let (last_birthday, years) = if as_of >= this_year {
        (this_year, as_of.year() - birth_date.year())
    } else {
        (
            anniversary(birth_date, as_of.year() - 1)?,
            as_of.year() - birth_date.year() - 1,
        )
    };
    let next_birthday = anniversary(birth_date, last_birthday.year() + 1)?;

    let days = (as_of - last_birthday).num_days() as u32;
    let days_in_year = (next_birthday - last_birthday).num_days() as u32;

    Ok(Age {
        years: years as u32,
        days,
        days_in_year,
        value: years as f64 + days as f64 / days_in_year as f64,
    })
}
