//! Run projections for every input in a batch CSV
//!
//! Writes one summary row per input for side-by-side comparison.

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use retirement_spending::{input::load_inputs, ProjectionConfig, ScenarioRunner, DEFAULT_TABLES_PATH};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "run_batch")]
struct Args {
    /// CSV of labelled inputs
    inputs: PathBuf,

    /// Directory holding the four life expectancy CSV tables
    #[arg(long, default_value = DEFAULT_TABLES_PATH)]
    tables_dir: PathBuf,

    /// Where to write the summary CSV
    #[arg(long, default_value = "batch_projection_output.csv")]
    output: PathBuf,
}

/// One summary row per input
#[derive(Debug, Serialize)]
struct BatchRow {
    label: String,
    first_daily_spend: Option<f64>,
    first_weekly_spend: Option<f64>,
    periods: usize,
    total_days: u32,
    total_drawdown: f64,
    total_interest: f64,
    final_assets: f64,
    final_date: Option<String>,
    termination: String,
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading inputs from {}...", args.inputs.display());
    let inputs = load_inputs(&args.inputs)?;
    println!("Loaded {} inputs in {:?}", inputs.len(), start.elapsed());

    let runner = ScenarioRunner::from_csv_path(&args.tables_dir)
        .with_context(|| format!("loading life expectancy tables from {}", args.tables_dir.display()))?;

    println!("Running projections...");
    let proj_start = Instant::now();
    let results = runner.run_batch(&inputs, ProjectionConfig::default());
    println!("Projections complete in {:?}", proj_start.elapsed());

    let mut writer = csv::Writer::from_writer(
        File::create(&args.output).with_context(|| format!("creating {}", args.output.display()))?,
    );
    let mut failures = 0;

    for (labelled, result) in inputs.iter().zip(&results) {
        let row = match result {
            Ok(projection) => {
                let summary = projection.summary();
                BatchRow {
                    label: labelled.label.clone(),
                    first_daily_spend: projection.first().map(|p| p.daily_spend_rate),
                    first_weekly_spend: projection.first().map(|p| p.weekly_spend()),
                    periods: summary.periods,
                    total_days: summary.total_days,
                    total_drawdown: summary.total_drawdown,
                    total_interest: summary.total_interest,
                    final_assets: summary.final_assets,
                    final_date: summary.final_date.map(|d| d.to_string()),
                    termination: format!("{:?}", summary.termination),
                    error: None,
                }
            }
            Err(e) => {
                warn!("{}: {}", labelled.label, e);
                failures += 1;
                BatchRow {
                    label: labelled.label.clone(),
                    first_daily_spend: None,
                    first_weekly_spend: None,
                    periods: 0,
                    total_days: 0,
                    total_drawdown: 0.0,
                    total_interest: 0.0,
                    final_assets: 0.0,
                    final_date: None,
                    termination: String::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        writer.serialize(row)?;
    }
    writer.flush()?;

    println!("Output written to {}", args.output.display());
    println!("\nBatch Summary:");
    println!("  Inputs:    {}", inputs.len());
    println!("  Succeeded: {}", inputs.len() - failures);
    println!("  Failed:    {}", failures);
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
