//! Day-stepped drawdown projection for a single retirement

mod state;
mod engine;
mod report;

pub use state::SimulationState;
pub use engine::{
    daily_interest_rate, run_projection, BudgetFrequency, FinalDayPolicy, ProjectionConfig, ProjectionEngine,
    DAYS_PER_YEAR, MAX_SIMULATION_DAYS,
};
pub use report::{DailyTrace, PeriodRecord, PeriodRow, Projection, ProjectionSummary, TerminationReason};
