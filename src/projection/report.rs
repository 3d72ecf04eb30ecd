//! Projection output: per-period records, the optional daily trace, and
//! presentation-ready rows

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::age::Age;

/// One budget period (normally a year) of the projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// Date the budget was set
    pub period_start: NaiveDate,
    pub age: Age,
    /// Expected age at death, interpolated at `age`
    pub life_expectancy: f64,
    /// `life_expectancy - age`
    pub years_remaining: f64,
    pub starting_assets: f64,

    // Rates held constant through the period
    pub daily_drawdown_rate: f64,
    pub daily_superannuation_rate: f64,
    pub daily_spend_rate: f64,

    // Accumulated through the period
    pub drawdown: f64,
    pub interest: f64,
    pub ending_assets: f64,
    /// Days simulated in this period
    pub days: u32,
}

impl PeriodRecord {
    /// Spend per week at this period's daily rate
    pub fn weekly_spend(&self) -> f64 {
        self.daily_spend_rate * 7.0
    }

    /// Last simulated day of the period, if any day was simulated
    pub fn last_day(&self) -> Option<NaiveDate> {
        if self.days == 0 {
            None
        } else {
            Some(self.period_start + Duration::days(self.days as i64 - 1))
        }
    }

    /// Flatten for tables and CSV export
    pub fn to_row(&self) -> PeriodRow {
        PeriodRow {
            date: self.period_start.format("%Y-%m-%d").to_string(),
            age: self.age.to_string(),
            age_value: self.age.value,
            life_expectancy: self.life_expectancy,
            years_remaining: self.years_remaining,
            starting_assets: self.starting_assets,
            daily_spend: self.daily_spend_rate,
            weekly_spend: self.weekly_spend(),
            drawdown: self.drawdown,
            interest: self.interest,
            ending_assets: self.ending_assets,
        }
    }
}

/// Flat, presentation-ready view of a `PeriodRecord`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRow {
    pub date: String,
    pub age: String,
    pub age_value: f64,
    pub life_expectancy: f64,
    pub years_remaining: f64,
    pub starting_assets: f64,
    pub daily_spend: f64,
    pub weekly_spend: f64,
    pub drawdown: f64,
    pub interest: f64,
    pub ending_assets: f64,
}

/// State at the end of one simulated day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTrace {
    pub date: NaiveDate,
    pub drawdown: f64,
    pub interest: f64,
    pub assets: f64,
}

/// Why the simulation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Assets went below zero
    Depleted,
    /// The 95th birthday was simulated
    MaxAgeReached,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Period records in chronological order
    pub periods: Vec<PeriodRecord>,

    /// Day-by-day trace, empty unless requested in the config
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub daily_trace: Vec<DailyTrace>,

    pub termination: TerminationReason,
}

impl Projection {
    /// Assemble sealed period records into a projection
    pub fn build(periods: Vec<PeriodRecord>, termination: TerminationReason) -> Self {
        debug_assert!(periods.windows(2).all(|w| w[0].period_start < w[1].period_start));
        Self {
            periods,
            daily_trace: Vec::new(),
            termination,
        }
    }

    pub fn with_daily_trace(mut self, trace: Vec<DailyTrace>) -> Self {
        self.daily_trace = trace;
        self
    }

    pub fn first(&self) -> Option<&PeriodRecord> {
        self.periods.first()
    }

    pub fn last(&self) -> Option<&PeriodRecord> {
        self.periods.last()
    }

    pub fn rows(&self) -> Vec<PeriodRow> {
        self.periods.iter().map(PeriodRecord::to_row).collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_drawdown: f64 = self.periods.iter().map(|p| p.drawdown).sum();
        let total_interest: f64 = self.periods.iter().map(|p| p.interest).sum();
        let total_days: u32 = self.periods.iter().map(|p| p.days).sum();

        let final_assets = self.last().map(|p| p.ending_assets).unwrap_or(0.0);
        let final_date = self.periods.iter().rev().find_map(PeriodRecord::last_day);

        ProjectionSummary {
            periods: self.periods.len(),
            total_days,
            total_drawdown,
            total_interest,
            final_assets,
            final_date,
            termination: self.termination,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub periods: usize,
    pub total_days: u32,
    pub total_drawdown: f64,
    pub total_interest: f64,
    pub final_assets: f64,
    pub final_date: Option<NaiveDate>,
    pub termination: TerminationReason,
}
