//! Core projection engine: day-stepped drawdown with periodic budget resets
//!
//! At each budget date the daily drawdown is reset to the current balance
//! spread over the remaining life expectancy (plus any additional longevity).
//! Between budget dates the drawdown is debited and interest compounded once
//! per calendar day.

use chrono::{Months, NaiveDate};
use log::{debug, warn};

use super::report::{DailyTrace, PeriodRecord, Projection, TerminationReason};
use super::state::SimulationState;
use crate::age::age_at;
use crate::error::{CalculatorError, Result};
use crate::input::RetirementInput;
use crate::life_expectancy::{LifeExpectancyTables, MAX_AGE};

/// Year length used to convert years into budget days
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Upper bound on simulated days; a run from birth to 95 cannot exceed it
pub const MAX_SIMULATION_DAYS: u32 = (MAX_AGE + 1) * 366;

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// How often the budget is recomputed
    pub budget_frequency: BudgetFrequency,

    /// What happens on the day the drawdown would overdraw assets
    pub final_day_policy: FinalDayPolicy,

    /// Whether to keep a day-by-day trace in the result
    pub record_daily_trace: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            budget_frequency: BudgetFrequency::Annual,
            final_day_policy: FinalDayPolicy::DebitThenCheck,
            record_daily_trace: false,
        }
    }
}

/// Interval between budget recomputations, counted in calendar months from
/// the retirement date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetFrequency {
    Annual,
    Quarterly,
    Monthly,
}

impl BudgetFrequency {
    pub fn months(&self) -> u32 {
        match self {
            BudgetFrequency::Annual => 12,
            BudgetFrequency::Quarterly => 3,
            BudgetFrequency::Monthly => 1,
        }
    }
}

/// Ordering of the depletion check on the final day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalDayPolicy {
    /// Debit the day's drawdown, then stop (without interest) if assets are
    /// negative. The final record shows the overdrawn balance.
    DebitThenCheck,
    /// Stop before debiting a drawdown that would overdraw assets. The final
    /// record keeps the remaining non-negative balance.
    StopBeforeDebit,
}

/// Daily compounding rate equivalent to an annual rate
///
/// Uses a 365-day year, unlike budget sizing which uses 365.25.
pub fn daily_interest_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 365.0) - 1.0
}

/// Project with the default configuration
pub fn run_projection(tables: &LifeExpectancyTables, input: &RetirementInput) -> Result<Projection> {
    ProjectionEngine::new(tables, ProjectionConfig::default()).project(input)
}

/// Main projection engine
///
/// Borrows the tables, so one set of tables can serve many engines.
pub struct ProjectionEngine<'a> {
    tables: &'a LifeExpectancyTables,
    config: ProjectionConfig,
}

impl<'a> ProjectionEngine<'a> {
    /// Create a new projection engine with given tables and config
    pub fn new(tables: &'a LifeExpectancyTables, config: ProjectionConfig) -> Self {
        Self { tables, config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run the projection for one input
    pub fn project(&self, input: &RetirementInput) -> Result<Projection> {
        input.validate()?;

        let max_date = input.max_date()?;
        let daily_rate = daily_interest_rate(input.interest_rate);

        let mut state = SimulationState::new(input.retirement_date, input.starting_assets);
        let mut next_budget_date = input.retirement_date;
        let mut periods = Vec::new();
        let mut trace: Vec<DailyTrace> = Vec::new();
        let mut termination = TerminationReason::MaxAgeReached;
        let mut iterations = 0u32;

        while state.date <= max_date {
            iterations += 1;
            if iterations > MAX_SIMULATION_DAYS {
                return Err(CalculatorError::IterationLimit {
                    days: MAX_SIMULATION_DAYS,
                });
            }

            // Budget update
            if state.date >= next_budget_date {
                let record = self.open_budget(input, &state)?;
                if let Some(sealed) = state.open_period(record) {
                    periods.push(sealed);
                }
                next_budget_date = self.budget_date(input.retirement_date, state.next_budget_index)?;
            }

            // Drawdown
            let drawdown = state.daily_drawdown_rate();
            match self.config.final_day_policy {
                FinalDayPolicy::DebitThenCheck => {
                    state.debit();
                    if state.is_depleted() {
                        if self.config.record_daily_trace {
                            trace.push(state.trace(drawdown, 0.0));
                        }
                        termination = TerminationReason::Depleted;
                        break;
                    }
                }
                FinalDayPolicy::StopBeforeDebit => {
                    if state.assets - drawdown < 0.0 {
                        termination = TerminationReason::Depleted;
                        break;
                    }
                    state.debit();
                }
            }

            // Interest
            let interest = state.accrue_interest(daily_rate);
            if self.config.record_daily_trace {
                trace.push(state.trace(drawdown, interest));
            }

            state.date = state
                .date
                .succ_opt()
                .ok_or_else(|| CalculatorError::invalid("date", state.date, "is the last supported date"))?;
        }

        if let Some(last) = state.seal_period() {
            periods.push(last);
        }

        debug!(
            "Projection from {} finished after {} days in {} periods ({:?})",
            input.retirement_date,
            state.days_simulated,
            periods.len(),
            termination
        );

        Ok(Projection::build(periods, termination).with_daily_trace(trace))
    }

    /// Compute the budget for a period starting on the state's current date
    fn open_budget(&self, input: &RetirementInput, state: &SimulationState) -> Result<PeriodRecord> {
        let age = age_at(state.date, input.date_of_birth)?;
        let life_expectancy =
            self.tables
                .interpolate(input.sex, input.longevity, input.birth_year(), age.value)?;
        let years_remaining = life_expectancy - age.value;

        let mut days_remaining = (years_remaining + input.additional_longevity) * DAYS_PER_YEAR;
        if !(days_remaining > 0.0) {
            warn!(
                "Budget on {} has {} days remaining (life expectancy {:.3} at age {:.3}); budgeting a single day",
                state.date, days_remaining, life_expectancy, age.value
            );
            days_remaining = 1.0;
        }

        let daily_drawdown_rate = state.assets / days_remaining;
        let daily_superannuation_rate = input.superannuation / DAYS_PER_YEAR;
        let daily_spend_rate = daily_drawdown_rate + daily_superannuation_rate;

        debug!(
            "Budget {}: age {}, life expectancy {:.3}, assets {:.2}, spend/day {:.4}",
            state.date, age, life_expectancy, state.assets, daily_spend_rate
        );

        Ok(PeriodRecord {
            period_start: state.date,
            age,
            life_expectancy,
            years_remaining,
            starting_assets: state.assets,
            daily_drawdown_rate,
            daily_superannuation_rate,
            daily_spend_rate,
            drawdown: 0.0,
            interest: 0.0,
            ending_assets: state.assets,
            days: 0,
        })
    }

    /// Date of the `index`th budget update after the retirement date
    fn budget_date(&self, retirement_date: NaiveDate, index: u32) -> Result<NaiveDate> {
        retirement_date
            .checked_add_months(Months::new(self.config.budget_frequency.months() * index))
            .ok_or_else(|| {
                CalculatorError::invalid("retirement date", retirement_date, "is outside the supported calendar")
            })
    }
}
