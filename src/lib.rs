//! Retirement Spending - life-expectancy-based drawdown calculator
//!
//! This library provides:
//! - Cohort life expectancy tables by sex and longevity assumption
//! - Calendar-correct fractional ages
//! - Day-stepped projections that reset the spending budget each year
//! - Shareable query-string encoding of inputs
//! - Batch and sensitivity runs over many inputs

pub mod age;
pub mod error;
pub mod input;
pub mod life_expectancy;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use age::{age_at, Age};
pub use error::{CalculatorError, Result};
pub use input::{LabelledInput, RetirementInput, DEFAULT_BASE_ADDRESS};
pub use life_expectancy::{LifeExpectancyTables, Longevity, Sex, DEFAULT_TABLES_PATH};
pub use projection::{
    run_projection, BudgetFrequency, FinalDayPolicy, PeriodRecord, Projection, ProjectionConfig,
    ProjectionEngine, ProjectionSummary, TerminationReason,
};
pub use scenario::ScenarioRunner;
