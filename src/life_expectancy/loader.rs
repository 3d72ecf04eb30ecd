//! CSV-based life expectancy table loader
//!
//! Each table is a CSV file with a `year` column followed by one column per
//! age, headed `0` through `95`:
//!
//! ```text
//! year,0,1,2,...,95
//! 1876,48.1,53.9,...,98.2
//! ```

use std::io::Read;
use std::path::Path;

use log::info;

use super::table::{LifeExpectancyTable, AGE_COLUMNS, FIRST_BIRTH_YEAR, LAST_BIRTH_YEAR};
use super::{LifeExpectancyTables, Longevity, Sex};
use crate::error::{CalculatorError, Result};

/// Default path to the life expectancy tables directory
pub const DEFAULT_TABLES_PATH: &str = "data/life_expectancy";

/// File name of the table for a sex and longevity scenario, e.g. `male-median.csv`
pub fn table_file_name(sex: Sex, longevity: Longevity) -> String {
    format!("{}-{}.csv", sex, longevity)
}

/// Parse one table from any reader (file, string buffer, network body)
///
/// Rows must run contiguously from 1876 to 2016, so every birth year that
/// passes input validation has a row.
pub fn parse_table<R: Read>(name: &str, reader: R) -> Result<LifeExpectancyTable> {
    let mut reader = csv::Reader::from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| CalculatorError::data_load(name, e))?
        .clone();

    let year_column = headers
        .iter()
        .position(|h| h.trim() == "year")
        .ok_or_else(|| CalculatorError::data_load(name, "missing `year` column"))?;

    let mut age_columns = [0usize; AGE_COLUMNS];
    for (age, column) in age_columns.iter_mut().enumerate() {
        let header = age.to_string();
        *column = headers
            .iter()
            .position(|h| h.trim() == header)
            .ok_or_else(|| CalculatorError::data_load(name, format!("missing column for age {}", age)))?;
    }

    let mut first_birth_year = None;
    let mut rows = Vec::new();

    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| CalculatorError::data_load(name, e))?;

        let year_field = record.get(year_column).unwrap_or("").trim();
        let year: i32 = year_field.parse().map_err(|_| {
            CalculatorError::data_load(name, format!("row {}: bad birth year `{}`", line + 1, year_field))
        })?;

        let first = *first_birth_year.get_or_insert(year);
        let expected = first + rows.len() as i32;
        if year != expected {
            return Err(CalculatorError::data_load(
                name,
                format!("row {}: birth year {} breaks the sequence (expected {})", line + 1, year, expected),
            ));
        }

        let mut row = [0.0; AGE_COLUMNS];
        for (age, &column) in age_columns.iter().enumerate() {
            let field = record.get(column).unwrap_or("").trim();
            let value: f64 = field
                .parse()
                .ok()
                .filter(|v: &f64| v.is_finite())
                .ok_or_else(|| {
                    CalculatorError::data_load(
                        name,
                        format!("row {}: bad value `{}` for age {}", line + 1, field, age),
                    )
                })?;
            row[age] = value;
        }
        rows.push(row);
    }

    let first_birth_year =
        first_birth_year.ok_or_else(|| CalculatorError::data_load(name, "table has no rows"))?;

    let table = LifeExpectancyTable::new(first_birth_year, rows);
    if table.first_birth_year() != FIRST_BIRTH_YEAR || table.last_birth_year() != Some(LAST_BIRTH_YEAR) {
        return Err(CalculatorError::data_load(
            name,
            format!(
                "birth years {}..={} do not cover {}..={}",
                table.first_birth_year(),
                table.last_birth_year().unwrap_or(first_birth_year),
                FIRST_BIRTH_YEAR,
                LAST_BIRTH_YEAR
            ),
        ));
    }

    Ok(table)
}

/// Load one table from `dir`
pub fn load_table(dir: &Path, sex: Sex, longevity: Longevity) -> Result<LifeExpectancyTable> {
    let name = table_file_name(sex, longevity);
    let file = std::fs::File::open(dir.join(&name)).map_err(|e| CalculatorError::data_load(&name, e))?;
    let table = parse_table(&name, file)?;
    info!(
        "Loaded {} ({} birth years from {})",
        name,
        table.len(),
        table.first_birth_year()
    );
    Ok(table)
}

/// Load one table from `dir` without blocking the async runtime
pub async fn load_table_async(dir: &Path, sex: Sex, longevity: Longevity) -> Result<LifeExpectancyTable> {
    let name = table_file_name(sex, longevity);
    let bytes = tokio::fs::read(dir.join(&name))
        .await
        .map_err(|e| CalculatorError::data_load(&name, e))?;
    let table = parse_table(&name, bytes.as_slice())?;
    info!(
        "Loaded {} ({} birth years from {})",
        name,
        table.len(),
        table.first_birth_year()
    );
    Ok(table)
}

/// Load all four tables from `dir`, failing on the first bad table
pub fn load_tables(dir: &Path) -> Result<LifeExpectancyTables> {
    Ok(LifeExpectancyTables {
        male_median: load_table(dir, Sex::Male, Longevity::Median)?,
        male_high_longevity: load_table(dir, Sex::Male, Longevity::HighLongevity)?,
        female_median: load_table(dir, Sex::Female, Longevity::Median)?,
        female_high_longevity: load_table(dir, Sex::Female, Longevity::HighLongevity)?,
    })
}

/// Load all four tables concurrently; resolves once every table is in
pub async fn load_tables_async(dir: &Path) -> Result<LifeExpectancyTables> {
    let (male_median, male_high_longevity, female_median, female_high_longevity) = tokio::try_join!(
        load_table_async(dir, Sex::Male, Longevity::Median),
        load_table_async(dir, Sex::Male, Longevity::HighLongevity),
        load_table_async(dir, Sex::Female, Longevity::Median),
        load_table_async(dir, Sex::Female, Longevity::HighLongevity),
    )?;

    Ok(LifeExpectancyTables {
        male_median,
        male_high_longevity,
        female_median,
        female_high_longevity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::life_expectancy::fixtures;

    fn csv_header() -> String {
        let ages: Vec<String> = (0..AGE_COLUMNS).map(|a| a.to_string()).collect();
        format!("year,{}\n", ages.join(","))
    }

    fn csv_row(year: i32, base: f64) -> String {
        let values: Vec<String> = (0..AGE_COLUMNS)
            .map(|a| format!("{:.2}", base + a as f64 * 0.5))
            .collect();
        format!("{},{}\n", year, values.join(","))
    }

    fn table_text(first: i32, last: i32) -> String {
        let mut text = csv_header();
        for year in first..=last {
            text.push_str(&csv_row(year, 40.0 + (year - FIRST_BIRTH_YEAR) as f64 * 0.1));
        }
        text
    }

    fn write_tables_for(dir: &Path, first: i32, last: i32) {
        for (sex, longevity) in fixtures::all_keys() {
            std::fs::write(dir.join(table_file_name(sex, longevity)), table_text(first, last)).unwrap();
        }
    }

    fn write_tables(dir: &Path) {
        write_tables_for(dir, FIRST_BIRTH_YEAR, LAST_BIRTH_YEAR);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(table_file_name(Sex::Male, Longevity::Median), "male-median.csv");
        assert_eq!(
            table_file_name(Sex::Female, Longevity::HighLongevity),
            "female-high-longevity.csv"
        );
    }

    #[test]
    fn test_parse_table() {
        let text = table_text(FIRST_BIRTH_YEAR, LAST_BIRTH_YEAR);
        let table = parse_table("test.csv", text.as_bytes()).unwrap();

        assert_eq!(table.first_birth_year(), 1876);
        assert_eq!(table.last_birth_year(), Some(2016));
        assert_eq!(table.len(), 141);
        assert_eq!(table.value(1876, 0), Some(40.0));
        assert_eq!(table.value(1877, 95), Some(87.6));
    }

    #[test]
    fn test_parse_rejects_partial_birth_year_range() {
        let late_start = table_text(1877, LAST_BIRTH_YEAR);
        let err = parse_table("late.csv", late_start.as_bytes()).unwrap_err();
        assert!(matches!(err, CalculatorError::DataLoad { .. }));
        assert!(err.to_string().contains("1877..=2016"), "{}", err);

        let early_end = table_text(FIRST_BIRTH_YEAR, 2015);
        assert!(matches!(
            parse_table("early.csv", early_end.as_bytes()),
            Err(CalculatorError::DataLoad { .. })
        ));
    }

    #[test]
    fn test_short_tables_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        write_tables_for(dir.path(), 1990, 2000);

        match load_tables(dir.path()) {
            Err(CalculatorError::DataLoad { table, .. }) => assert_eq!(table, "male-median.csv"),
            other => panic!("expected DataLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_missing_age_column() {
        let ages: Vec<String> = (0..95).map(|a| a.to_string()).collect();
        let text = format!("year,{}\n1876,{}\n", ages.join(","), vec!["1.0"; 95].join(","));

        let err = parse_table("short.csv", text.as_bytes()).unwrap_err();
        assert!(matches!(err, CalculatorError::DataLoad { .. }));
        assert!(err.to_string().contains("age 95"), "{}", err);
    }

    #[test]
    fn test_parse_rejects_gaps_and_bad_values() {
        let gap = format!("{}{}{}", csv_header(), csv_row(1876, 50.0), csv_row(1878, 51.0));
        assert!(matches!(
            parse_table("gap.csv", gap.as_bytes()),
            Err(CalculatorError::DataLoad { .. })
        ));

        let bad = format!("{}{}", csv_header(), csv_row(1876, 50.0).replacen("50.00", "abc", 1));
        assert!(matches!(
            parse_table("bad.csv", bad.as_bytes()),
            Err(CalculatorError::DataLoad { .. })
        ));

        assert!(matches!(
            parse_table("empty.csv", csv_header().as_bytes()),
            Err(CalculatorError::DataLoad { .. })
        ));
    }

    #[test]
    fn test_load_tables_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path());

        let tables = load_tables(dir.path()).unwrap();
        let male = tables.table(Sex::Male, Longevity::Median);
        assert_eq!(male.first_birth_year(), FIRST_BIRTH_YEAR);
        assert_eq!(male.last_birth_year(), Some(LAST_BIRTH_YEAR));
        assert_eq!(male.value(1960, 65), Some(80.9));
    }

    #[test]
    fn test_missing_table_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path());
        std::fs::remove_file(dir.path().join("female-high-longevity.csv")).unwrap();

        match load_tables(dir.path()) {
            Err(CalculatorError::DataLoad { table, .. }) => {
                assert_eq!(table, "female-high-longevity.csv")
            }
            other => panic!("expected DataLoad, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_tables_async_matches_sync() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path());

        let sync = load_tables(dir.path()).unwrap();
        let async_loaded = load_tables_async(dir.path()).await.unwrap();
        assert_eq!(sync, async_loaded);
    }

    #[tokio::test]
    async fn test_load_tables_async_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_tables_async(&dir.path().join("absent")).await;
        assert!(matches!(result, Err(CalculatorError::DataLoad { .. })));
    }
}
