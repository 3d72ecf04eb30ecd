//! Scenario runner for batch projections
//!
//! Loads the life expectancy tables once, then runs many projections with
//! different inputs or configurations without re-reading CSV files.

use std::path::Path;

use rayon::prelude::*;

use crate::error::Result;
use crate::input::{LabelledInput, RetirementInput};
use crate::life_expectancy::LifeExpectancyTables;
use crate::projection::{Projection, ProjectionConfig, ProjectionEngine};

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
///
/// for rate in [0.03, 0.04, 0.05] {
///     let input = RetirementInput { interest_rate: rate, ..base.clone() };
///     let projection = runner.run(&input, ProjectionConfig::default())?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    tables: LifeExpectancyTables,
}

impl ScenarioRunner {
    /// Create runner by loading tables from the default directory
    pub fn from_csv() -> Result<Self> {
        Ok(Self {
            tables: LifeExpectancyTables::load_default()?,
        })
    }

    /// Create runner from a specific tables directory
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Ok(Self {
            tables: LifeExpectancyTables::load(path)?,
        })
    }

    /// Create runner with pre-built tables
    pub fn with_tables(tables: LifeExpectancyTables) -> Self {
        Self { tables }
    }

    /// Run a single projection with the given config
    pub fn run(&self, input: &RetirementInput, config: ProjectionConfig) -> Result<Projection> {
        ProjectionEngine::new(&self.tables, config).project(input)
    }

    /// Run projections for many inputs in parallel, preserving input order
    pub fn run_batch(&self, inputs: &[LabelledInput], config: ProjectionConfig) -> Vec<Result<Projection>> {
        let engine = ProjectionEngine::new(&self.tables, config);
        inputs.par_iter().map(|labelled| engine.project(&labelled.input)).collect()
    }

    /// Run multiple configurations for a single input
    pub fn run_scenarios(&self, input: &RetirementInput, configs: &[ProjectionConfig]) -> Vec<Result<Projection>> {
        configs
            .par_iter()
            .map(|config| ProjectionEngine::new(&self.tables, config.clone()).project(input))
            .collect()
    }

    /// Re-run an input at each annual interest rate
    pub fn interest_rate_sensitivity(
        &self,
        input: &RetirementInput,
        rates: &[f64],
        config: ProjectionConfig,
    ) -> Vec<(f64, Result<Projection>)> {
        let engine = ProjectionEngine::new(&self.tables, config);
        rates
            .par_iter()
            .map(|&rate| {
                let scenario = RetirementInput {
                    interest_rate: rate,
                    ..input.clone()
                };
                (rate, engine.project(&scenario))
            })
            .collect()
    }

    pub fn tables(&self) -> &LifeExpectancyTables {
        &self.tables
    }
}
