//! Simulation state carried from day to day

use chrono::NaiveDate;

use super::report::{DailyTrace, PeriodRecord};

/// State of a retirement at a point in the daily simulation
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Day being simulated
    pub date: NaiveDate,

    /// Current asset balance
    pub assets: f64,

    /// Record for the budget period in progress, if one has been opened
    pub period: Option<PeriodRecord>,

    /// Index of the next budget update (0 = the retirement date itself)
    pub next_budget_index: u32,

    /// Days simulated so far across all periods
    pub days_simulated: u32,
}

impl SimulationState {
    /// Initialize state at the retirement date, before any period is open
    pub fn new(retirement_date: NaiveDate, starting_assets: f64) -> Self {
        Self {
            date: retirement_date,
            assets: starting_assets,
            period: None,
            next_budget_index: 0,
            days_simulated: 0,
        }
    }

    /// Seal the open period (if any) and start `record`
    pub fn open_period(&mut self, record: PeriodRecord) -> Option<PeriodRecord> {
        let sealed = self.seal_period();
        self.period = Some(record);
        self.next_budget_index += 1;
        sealed
    }

    /// Close the open period with the current balance
    pub fn seal_period(&mut self) -> Option<PeriodRecord> {
        let assets = self.assets;
        self.period.take().map(|mut record| {
            record.ending_assets = assets;
            record
        })
    }

    /// Daily drawdown rate of the open period
    pub fn daily_drawdown_rate(&self) -> f64 {
        self.period.as_ref().map(|p| p.daily_drawdown_rate).unwrap_or(0.0)
    }

    /// Withdraw one day's drawdown from assets
    pub fn debit(&mut self) {
        let amount = self.daily_drawdown_rate();
        if let Some(period) = self.period.as_mut() {
            period.drawdown += amount;
            period.days += 1;
        }
        self.assets -= amount;
        self.days_simulated += 1;
    }

    /// Credit one day's interest on the current balance, returning the amount
    pub fn accrue_interest(&mut self, daily_rate: f64) -> f64 {
        let interest = self.assets * daily_rate;
        if let Some(period) = self.period.as_mut() {
            period.interest += interest;
        }
        self.assets += interest;
        interest
    }

    /// Whether assets have gone below zero
    pub fn is_depleted(&self) -> bool {
        self.assets < 0.0
    }

    /// Snapshot of the day just simulated
    pub fn trace(&self, drawdown: f64, interest: f64) -> DailyTrace {
        DailyTrace {
            date: self.date,
            drawdown,
            interest,
            assets: self.assets,
        }
    }
}
