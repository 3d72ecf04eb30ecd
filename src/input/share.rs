//! Compact query-string encoding of an input, for shareable links and QR payloads
//!
//! | key | field                 | format                |
//! |-----|-----------------------|-----------------------|
//! | `s` | sex                   | `m` / `f`             |
//! | `b` | date of birth         | `YYYY-MM-DD`          |
//! | `l` | longevity             | `m` (median) / `l`    |
//! | `a` | additional longevity  | years                 |
//! | `d` | retirement date       | `YYYY-MM-DD`          |
//! | `x` | starting assets       | amount                |
//! | `y` | superannuation        | annual amount         |
//! | `i` | interest rate         | percent (5 for 5%)    |

use std::collections::HashMap;

use chrono::NaiveDate;
use url::{form_urlencoded, Url};

use super::RetirementInput;
use crate::error::{CalculatorError, Result};
use crate::life_expectancy::{Longevity, Sex};

/// Address of the calculator page that shareable links point at
pub const DEFAULT_BASE_ADDRESS: &str = "http://localhost:8000/index.html";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn sex_code(sex: Sex) -> &'static str {
    match sex {
        Sex::Male => "m",
        Sex::Female => "f",
    }
}

fn longevity_code(longevity: Longevity) -> &'static str {
    match longevity {
        Longevity::Median => "m",
        Longevity::HighLongevity => "l",
    }
}

impl RetirementInput {
    /// Encode as `s=m&b=1960-01-01&l=m&...`
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("s", sex_code(self.sex))
            .append_pair("b", &self.date_of_birth.format(DATE_FORMAT).to_string())
            .append_pair("l", longevity_code(self.longevity))
            .append_pair("a", &self.additional_longevity.to_string())
            .append_pair("d", &self.retirement_date.format(DATE_FORMAT).to_string())
            .append_pair("x", &self.starting_assets.to_string())
            .append_pair("y", &self.superannuation.to_string())
            .append_pair("i", &percent(self.interest_rate))
            .finish()
    }

    /// Personalised link to the calculator at `base`
    pub fn share_link(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base).map_err(|e| CalculatorError::invalid("base address", base, e.to_string()))?;
        url.set_query(Some(self.to_query_string().as_str()));
        Ok(url)
    }

    /// Decode a query string (with or without the leading `?`) and validate it
    pub fn from_query_string(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params: HashMap<String, String> = HashMap::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }
        Self::from_params(|key| params.get(key).map(String::as_str))
    }

    /// Decode the query part of a full link
    pub fn from_link(link: &str) -> Result<Self> {
        let url = Url::parse(link).map_err(|e| CalculatorError::invalid("link", link, e.to_string()))?;
        Self::from_query_string(url.query().unwrap_or(""))
    }

    /// Decode from any key lookup (a parsed query map, form fields, ...)
    ///
    /// Every key must be present. The decoded input is validated with the
    /// same rules a projection applies.
    pub fn from_params<'a, F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let required = |key: &'static str| {
            get(key)
                .map(str::trim)
                .ok_or_else(|| CalculatorError::invalid("link parameter", key, "is missing"))
        };

        let sex = match required("s")? {
            "m" => Sex::Male,
            "f" => Sex::Female,
            other => return Err(CalculatorError::invalid("sex", other, "must be either 'm' or 'f'")),
        };
        let longevity = match required("l")? {
            "m" => Longevity::Median,
            "l" => Longevity::HighLongevity,
            other => return Err(CalculatorError::invalid("longevity", other, "must be either 'm' or 'l'")),
        };

        let input = RetirementInput {
            sex,
            longevity,
            date_of_birth: parse_date("date of birth", required("b")?)?,
            additional_longevity: parse_number("additional longevity", required("a")?)?,
            retirement_date: parse_date("retirement date", required("d")?)?,
            starting_assets: parse_number("starting assets", required("x")?)?,
            superannuation: parse_number("superannuation", required("y")?)?,
            interest_rate: parse_number("interest rate", required("i")?)? / 100.0,
        };

        input.validate()?;
        Ok(input)
    }
}

/// Rate as a percentage rounded to 10 decimals, so 0.07 encodes as `7`
fn percent(rate: f64) -> String {
    let scaled = (rate * 100.0 * 1e10).round() / 1e10;
    // avoid "-0"
    if scaled == 0.0 {
        "0".to_string()
    } else {
        scaled.to_string()
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| CalculatorError::invalid(field, value, "must be a date in YYYY-MM-DD format"))
}

fn parse_number(field: &'static str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CalculatorError::invalid(field, value, "must be a number"))
}
