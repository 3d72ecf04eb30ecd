//! Retirement spending calculator CLI
//!
//! Projects how much can be spent each year in retirement, reading the
//! inputs either from flags or from a shareable link.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use retirement_spending::{
    BudgetFrequency, FinalDayPolicy, LifeExpectancyTables, Longevity, ProjectionConfig, ProjectionEngine,
    RetirementInput, Sex, DEFAULT_BASE_ADDRESS, DEFAULT_TABLES_PATH,
};

/// retirement: a life-expectancy-based retirement spending calculator.
///
/// Inputs can be given as flags, or as a link produced by a previous run
/// (`--link`). When a link is given the individual input flags are ignored.
#[derive(Debug, Parser)]
#[command(name = "retirement", version)]
struct Args {
    /// Shareable link or bare query string (`s=m&b=1960-01-01&...`)
    #[arg(long)]
    link: Option<String>,

    /// male or female
    #[arg(long)]
    sex: Option<Sex>,

    /// median or high-longevity
    #[arg(long, default_value = "median")]
    longevity: Longevity,

    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    dob: Option<NaiveDate>,

    /// Retirement date, YYYY-MM-DD
    #[arg(long)]
    retirement_date: Option<NaiveDate>,

    /// Assets at retirement
    #[arg(long)]
    assets: Option<f64>,

    /// Annual superannuation or pension income
    #[arg(long, default_value_t = 0.0)]
    superannuation: f64,

    /// Annual interest rate in percent (5 for 5%)
    #[arg(long, default_value_t = 5.0, allow_negative_numbers = true)]
    interest: f64,

    /// Years to plan beyond the tabulated life expectancy
    #[arg(long, default_value_t = 0.0)]
    additional_longevity: f64,

    /// Directory holding the four life expectancy CSV tables
    #[arg(long, default_value = DEFAULT_TABLES_PATH)]
    tables_dir: PathBuf,

    /// How often the budget is recomputed
    #[arg(long, value_enum, default_value_t = Frequency::Annual)]
    frequency: Frequency,

    /// Stop before a drawdown that would overdraw assets, instead of after it
    #[arg(long)]
    stop_before_debit: bool,

    /// Write the period table to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the day-by-day trace to this CSV file
    #[arg(long)]
    daily_trace: Option<PathBuf>,

    /// Calculator page the shareable link points at
    #[arg(long, default_value = DEFAULT_BASE_ADDRESS)]
    base_url: String,

    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Frequency {
    Annual,
    Quarterly,
    Monthly,
}

impl From<Frequency> for BudgetFrequency {
    fn from(frequency: Frequency) -> Self {
        match frequency {
            Frequency::Annual => BudgetFrequency::Annual,
            Frequency::Quarterly => BudgetFrequency::Quarterly,
            Frequency::Monthly => BudgetFrequency::Monthly,
        }
    }
}

impl Args {
    fn input(&self) -> Result<RetirementInput> {
        if let Some(link) = &self.link {
            let input = if link.contains("://") {
                RetirementInput::from_link(link)?
            } else {
                RetirementInput::from_query_string(link)?
            };
            return Ok(input);
        }

        let (Some(sex), Some(date_of_birth), Some(retirement_date), Some(starting_assets)) =
            (self.sex, self.dob, self.retirement_date, self.assets)
        else {
            bail!("--sex, --dob, --retirement-date and --assets are required unless --link is given");
        };

        let input = RetirementInput {
            sex,
            longevity: self.longevity,
            date_of_birth,
            additional_longevity: self.additional_longevity,
            retirement_date,
            starting_assets,
            superannuation: self.superannuation,
            interest_rate: self.interest / 100.0,
        };
        input.validate()?;
        Ok(input)
    }

    fn config(&self) -> ProjectionConfig {
        ProjectionConfig {
            budget_frequency: self.frequency.into(),
            final_day_policy: if self.stop_before_debit {
                FinalDayPolicy::StopBeforeDebit
            } else {
                FinalDayPolicy::DebitThenCheck
            },
            record_daily_trace: self.daily_trace.is_some(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .parse_default_env()
        .init();

    let input = args.input()?;
    let tables = LifeExpectancyTables::load(&args.tables_dir)
        .with_context(|| format!("loading life expectancy tables from {}", args.tables_dir.display()))?;

    let projection = ProjectionEngine::new(&tables, args.config()).project(&input)?;
    let summary = projection.summary();

    println!("Retirement Spending Projection");
    println!("==============================\n");
    println!("  Sex: {}  Longevity: {}", input.sex, input.longevity);
    println!("  Born: {}  Retiring: {}", input.date_of_birth, input.retirement_date);
    println!("  Assets: ${:.2}  Superannuation: ${:.2}/yr", input.starting_assets, input.superannuation);
    println!("  Interest: {:.3}%  Additional longevity: {} yrs", input.interest_rate * 100.0, input.additional_longevity);
    println!();

    println!(
        "{:>10} {:>18} {:>8} {:>8} {:>14} {:>10} {:>10} {:>14}",
        "Date", "Age", "LifeExp", "YrsLeft", "Assets", "Daily", "Weekly", "EndAssets"
    );
    println!("{}", "-".repeat(100));
    for row in projection.rows() {
        println!(
            "{:>10} {:>18} {:>8.2} {:>8.2} {:>14.2} {:>10.2} {:>10.2} {:>14.2}",
            row.date,
            row.age,
            row.life_expectancy,
            row.years_remaining,
            row.starting_assets,
            row.daily_spend,
            row.weekly_spend,
            row.ending_assets,
        );
    }

    println!();
    println!("Summary:");
    println!("  Periods: {}  Days: {}", summary.periods, summary.total_days);
    println!("  Total drawdown: ${:.2}", summary.total_drawdown);
    println!("  Total interest: ${:.2}", summary.total_interest);
    println!("  Final assets:   ${:.2}", summary.final_assets);
    if let Some(final_date) = summary.final_date {
        println!("  Final day:      {} ({:?})", final_date, summary.termination);
    }

    if let Some(path) = &args.output {
        let mut writer = csv::Writer::from_writer(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        );
        for row in projection.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        info!("Period table written to {}", path.display());
        println!("\nPeriod table written to {}", path.display());
    }

    if let Some(path) = &args.daily_trace {
        let mut writer = csv::Writer::from_writer(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        );
        for day in &projection.daily_trace {
            writer.serialize(day)?;
        }
        writer.flush()?;
        println!("Daily trace written to {}", path.display());
    }

    let link = input.share_link(&args.base_url)?;
    println!("\nShare this projection: {}", link);

    Ok(())
}

