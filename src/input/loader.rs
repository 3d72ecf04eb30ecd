//! Load batches of retirement inputs from CSV
//!
//! Columns: `label,sex,longevity,date_of_birth,additional_longevity,
//! retirement_date,starting_assets,superannuation,interest_rate`, with the
//! interest rate as a decimal.

use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;
use serde::Deserialize;

use super::RetirementInput;
use crate::error::{CalculatorError, Result};

/// An input with the label it carried in the batch file
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledInput {
    pub label: String,
    pub input: RetirementInput,
}

/// Raw CSV row
#[derive(Debug, Deserialize)]
struct CsvRow {
    label: String,
    sex: String,
    longevity: String,
    date_of_birth: NaiveDate,
    additional_longevity: f64,
    retirement_date: NaiveDate,
    starting_assets: f64,
    superannuation: f64,
    interest_rate: f64,
}

impl CsvRow {
    fn into_input(self) -> Result<LabelledInput> {
        let input = RetirementInput {
            sex: self.sex.trim().parse()?,
            longevity: self.longevity.trim().parse()?,
            date_of_birth: self.date_of_birth,
            additional_longevity: self.additional_longevity,
            retirement_date: self.retirement_date,
            starting_assets: self.starting_assets,
            superannuation: self.superannuation,
            interest_rate: self.interest_rate,
        };
        input.validate()?;

        Ok(LabelledInput {
            label: self.label,
            input,
        })
    }
}

/// Load all inputs from a CSV file
pub fn load_inputs<P: AsRef<Path>>(path: P) -> Result<Vec<LabelledInput>> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| CalculatorError::invalid("input file", path.as_ref().display(), e.to_string()))?;
    load_inputs_from_reader(file)
}

/// Load inputs from any reader (e.g., string buffer, network stream)
pub fn load_inputs_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LabelledInput>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut inputs = Vec::new();

    for (line, result) in csv_reader.deserialize().enumerate() {
        let row: CsvRow = result
            .map_err(|e| CalculatorError::invalid("input row", line + 1, e.to_string()))?;
        inputs.push(row.into_input()?);
    }

    Ok(inputs)
}
