//! Life expectancy tables and fractional-age interpolation
//!
//! Four tables are held: male/female crossed with median and high-longevity
//! scenarios. Each maps (birth year, attained age) to the expected age at
//! death for a person of that cohort who has reached that age.

mod table;
pub mod loader;

pub use loader::{load_tables, load_tables_async, parse_table, table_file_name, DEFAULT_TABLES_PATH};
pub use table::{LifeExpectancyTable, AGE_COLUMNS, FIRST_BIRTH_YEAR, LAST_BIRTH_YEAR, MAX_AGE};

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CalculatorError, Result};

/// Sex used to select a life expectancy table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = CalculatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(CalculatorError::invalid(
                "sex",
                other,
                "must be either 'male' or 'female'",
            )),
        }
    }
}

/// Longevity scenario: which variant of the table to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Longevity {
    /// Median life expectancy
    Median,
    /// Longer-life assumption, for a more conservative budget
    HighLongevity,
}

impl Longevity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Longevity::Median => "median",
            Longevity::HighLongevity => "high-longevity",
        }
    }
}

impl fmt::Display for Longevity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Longevity {
    type Err = CalculatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "median" => Ok(Longevity::Median),
            "high-longevity" => Ok(Longevity::HighLongevity),
            other => Err(CalculatorError::invalid(
                "longevity",
                other,
                "must be either 'median' or 'high-longevity'",
            )),
        }
    }
}

/// The four loaded tables, immutable once built
///
/// Projections borrow this; it is `Sync`, so any number of runs may read it
/// at once.
#[derive(Debug, Clone, PartialEq)]
pub struct LifeExpectancyTables {
    pub male_median: LifeExpectancyTable,
    pub male_high_longevity: LifeExpectancyTable,
    pub female_median: LifeExpectancyTable,
    pub female_high_longevity: LifeExpectancyTable,
}

impl LifeExpectancyTables {
    /// Load tables from the default location (data/life_expectancy/)
    pub fn load_default() -> Result<Self> {
        Self::load(Path::new(DEFAULT_TABLES_PATH))
    }

    /// Load tables from a specific directory
    pub fn load(dir: &Path) -> Result<Self> {
        load_tables(dir)
    }

    /// Load tables from a specific directory, reading all four concurrently
    pub async fn load_async(dir: &Path) -> Result<Self> {
        load_tables_async(dir).await
    }

    /// Table for a sex and longevity scenario
    pub fn table(&self, sex: Sex, longevity: Longevity) -> &LifeExpectancyTable {
        match (sex, longevity) {
            (Sex::Male, Longevity::Median) => &self.male_median,
            (Sex::Male, Longevity::HighLongevity) => &self.male_high_longevity,
            (Sex::Female, Longevity::Median) => &self.female_median,
            (Sex::Female, Longevity::HighLongevity) => &self.female_high_longevity,
        }
    }

    /// Expected age at death for a cohort at an integer age
    ///
    /// Birth year must be within 1876..=2016 and age within 0..=95.
    pub fn lookup(&self, sex: Sex, longevity: Longevity, birth_year: i32, age: u32) -> Result<f64> {
        validate_birth_year(birth_year)?;
        if age > MAX_AGE {
            return Err(CalculatorError::invalid(
                "age",
                age,
                format!("must be no greater than {}", MAX_AGE),
            ));
        }

        self.table(sex, longevity)
            .value(birth_year, age)
            .ok_or_else(|| CalculatorError::DataUnavailable {
                table: format!("{}-{}", sex, longevity),
                birth_year,
                age,
            })
    }

    /// Expected age at death at a fractional age, linearly interpolated
    /// between the surrounding integer ages
    ///
    /// At exactly 95 the ceiling is clamped so age 96 is never looked up.
    pub fn interpolate(&self, sex: Sex, longevity: Longevity, birth_year: i32, age: f64) -> Result<f64> {
        if !age.is_finite() {
            return Err(CalculatorError::invalid(
                "age",
                age,
                format!("must be a number between 0 and {} (inclusive)", MAX_AGE),
            ));
        }
        if age < 0.0 {
            return Err(CalculatorError::invalid("age", age, "must not be negative"));
        }
        if age > MAX_AGE as f64 {
            return Err(CalculatorError::invalid(
                "age",
                age,
                format!("must be no greater than {}", MAX_AGE),
            ));
        }

        let floor_age = age.floor() as u32;
        let ceil_age = (age.ceil() as u32).min(MAX_AGE);
        let weight = age - floor_age as f64;
        debug_assert!((0.0..=1.0).contains(&weight));

        let floor_value = self.lookup(sex, longevity, birth_year, floor_age)?;
        if ceil_age == floor_age {
            return Ok(floor_value);
        }
        let ceil_value = self.lookup(sex, longevity, birth_year, ceil_age)?;

        Ok((1.0 - weight) * floor_value + weight * ceil_value)
    }
}

/// Check a birth year against the range the published tables cover
pub fn validate_birth_year(birth_year: i32) -> Result<()> {
    if birth_year < FIRST_BIRTH_YEAR {
        return Err(CalculatorError::invalid(
            "birth year",
            birth_year,
            format!("must be no earlier than {}", FIRST_BIRTH_YEAR),
        ));
    }
    if birth_year > LAST_BIRTH_YEAR {
        return Err(CalculatorError::invalid(
            "birth year",
            birth_year,
            format!("must be no later than {}", LAST_BIRTH_YEAR),
        ));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_parse_sex_and_longevity() {
        assert_eq!("male".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("female".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!("median".parse::<Longevity>().unwrap(), Longevity::Median);
        assert_eq!(
            "high-longevity".parse::<Longevity>().unwrap(),
            Longevity::HighLongevity
        );

        match "other".parse::<Sex>() {
            Err(CalculatorError::InvalidInput { field, .. }) => assert_eq!(field, "sex"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        match "low".parse::<Longevity>() {
            Err(CalculatorError::InvalidInput { field, .. }) => assert_eq!(field, "longevity"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_returns_table_value() {
        let tables = synthetic_tables();
        let value = tables.lookup(Sex::Male, Longevity::Median, 1960, 65).unwrap();
        assert_eq!(value, synthetic_value(Sex::Male, Longevity::Median, 1960, 65));

        let female = tables.lookup(Sex::Female, Longevity::HighLongevity, 1960, 65).unwrap();
        assert!(female > value);
    }

    #[test]
    fn test_lookup_rejects_out_of_range_inputs() {
        let tables = synthetic_tables();

        let early = tables.lookup(Sex::Male, Longevity::Median, 1875, 10).unwrap_err();
        assert!(early.to_string().contains("no earlier than 1876"), "{}", early);

        let late = tables.lookup(Sex::Male, Longevity::Median, 2017, 10).unwrap_err();
        assert!(late.to_string().contains("no later than 2016"), "{}", late);

        let old = tables.lookup(Sex::Male, Longevity::Median, 1960, 96).unwrap_err();
        assert!(matches!(old, CalculatorError::InvalidInput { field: "age", .. }));

        assert!(tables.lookup(Sex::Male, Longevity::Median, 1876, 0).is_ok());
        assert!(tables.lookup(Sex::Male, Longevity::Median, 2016, 95).is_ok());
    }

    #[test]
    fn test_lookup_outside_loaded_rows_is_data_unavailable() {
        let tables = tables_from_fn(1950, 1970, synthetic_value);

        match tables.lookup(Sex::Female, Longevity::Median, 1980, 30) {
            Err(CalculatorError::DataUnavailable { table, birth_year, age }) => {
                assert_eq!(table, "female-median");
                assert_eq!(birth_year, 1980);
                assert_eq!(age, 30);
            }
            other => panic!("expected DataUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_interpolate_midpoint() {
        let tables = synthetic_tables();
        let at_65 = tables.lookup(Sex::Male, Longevity::Median, 1960, 65).unwrap();
        let at_66 = tables.lookup(Sex::Male, Longevity::Median, 1960, 66).unwrap();

        let mid = tables.interpolate(Sex::Male, Longevity::Median, 1960, 65.5).unwrap();
        assert_relative_eq!(mid, (at_65 + at_66) / 2.0, epsilon = 1e-12);

        let quarter = tables.interpolate(Sex::Male, Longevity::Median, 1960, 65.25).unwrap();
        assert_relative_eq!(quarter, 0.75 * at_65 + 0.25 * at_66, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate_at_max_age_does_not_read_past_table() {
        let tables = synthetic_tables();
        let at_95 = tables.lookup(Sex::Female, Longevity::Median, 1930, 95).unwrap();
        let value = tables.interpolate(Sex::Female, Longevity::Median, 1930, 95.0).unwrap();
        assert_eq!(value, at_95);
    }

    #[test]
    fn test_interpolate_rejects_bad_ages() {
        let tables = synthetic_tables();
        for age in [f64::NAN, f64::INFINITY, -0.5, 95.01] {
            assert!(matches!(
                tables.interpolate(Sex::Male, Longevity::Median, 1960, age),
                Err(CalculatorError::InvalidInput { field: "age", .. })
            ));
        }
    }

    proptest! {
        #[test]
        fn prop_interpolation_identity_at_integer_ages(
            key in 0usize..4,
            birth_year in FIRST_BIRTH_YEAR..=LAST_BIRTH_YEAR,
            age in 0u32..=MAX_AGE,
        ) {
            let tables = synthetic_tables();
            let (sex, longevity) = all_keys()[key];
            let looked_up = tables.lookup(sex, longevity, birth_year, age).unwrap();
            let interpolated = tables.interpolate(sex, longevity, birth_year, age as f64).unwrap();
            prop_assert_eq!(looked_up, interpolated);
        }

        #[test]
        fn prop_interpolation_is_bounded(
            key in 0usize..4,
            birth_year in FIRST_BIRTH_YEAR..=LAST_BIRTH_YEAR,
            age in 0.0f64..=95.0,
        ) {
            let tables = synthetic_tables();
            let (sex, longevity) = all_keys()[key];
            let low = tables.lookup(sex, longevity, birth_year, age.floor() as u32).unwrap();
            let high = tables.lookup(sex, longevity, birth_year, (age.ceil() as u32).min(MAX_AGE)).unwrap();
            let value = tables.interpolate(sex, longevity, birth_year, age).unwrap();

            let (min, max) = if low <= high { (low, high) } else { (high, low) };
            prop_assert!(value >= min - 1e-9 && value <= max + 1e-9);
        }
    }
}
