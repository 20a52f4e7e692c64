//! finsim CLI
//!
//! Command-line interface over the planning engines. Inputs are JSON files
//! (debts may also be CSV); results are printed as pretty JSON.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use finsim::debt::{ConsolidationOffer, DebtPayoff, Strategy};
use finsim::plan::{load_debts, load_goals, load_plan, load_scenarios, Debt, RetirementPlan};
use finsim::projection::YearlyProjection;
use finsim::{EngineConfig, Planner};

#[derive(Parser, Debug)]
#[command(
    name = "finsim",
    version,
    about = "Retirement projection, debt payoff and goal planning"
)]
struct Cli {
    #[arg(long, global = true, help = "JSON engine config; FINSIM_* variables override it")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project a retirement plan year by year
    Project {
        plan: PathBuf,
        #[arg(long, help = "Write the yearly projection to this CSV file")]
        schedule_csv: Option<PathBuf>,
    },
    /// Build a payoff plan, or compare avalanche and snowball when no strategy is given
    Debts {
        debts: PathBuf,
        #[arg(long, default_value = "0")]
        extra: Decimal,
        #[arg(long)]
        strategy: Option<Strategy>,
        #[arg(long, help = "Write the amortization schedule to this CSV file")]
        schedule_csv: Option<PathBuf>,
    },
    /// Evaluate a consolidation loan against the current debts
    Consolidate {
        debts: PathBuf,
        #[arg(long, help = "Loan APR in percent, e.g. 9.5")]
        rate: Decimal,
        #[arg(long, help = "Loan term in months; defaults to paying the current minimums")]
        term: Option<u32>,
    },
    /// Run a Monte Carlo simulation of a plan
    MonteCarlo {
        plan: PathBuf,
        #[arg(long)]
        simulations: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Step return, contribution and inflation around a plan
    Sensitivity { plan: PathBuf },
    /// Compare named overrides against a plan
    WhatIf { plan: PathBuf, scenarios: PathBuf },
    /// Score and rank financial goals
    Prioritize {
        goals: PathBuf,
        #[arg(long, help = "Total monthly capacity; defaults to the sum of goal capacities")]
        capacity: Option<Decimal>,
    },
}

/// Flat amortization row for CSV output
#[derive(Serialize)]
struct ScheduleRow<'a> {
    debt: &'a str,
    payoff_order: usize,
    month: u32,
    opening_balance: Decimal,
    interest: Decimal,
    payment: Decimal,
    closing_balance: Decimal,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_path(path)
            .map_err(|e| anyhow!("reading config {}: {}", path.display(), e))?,
        None => EngineConfig::default(),
    }
    .with_env_overrides();

    if let Command::MonteCarlo { simulations, seed, .. } = &cli.command {
        if let Some(n) = simulations {
            config.monte_carlo.num_simulations = *n;
        }
        if let Some(s) = seed {
            config.monte_carlo.seed = *s;
        }
    }

    let planner = Planner::new(config).context("invalid engine configuration")?;

    match cli.command {
        Command::Project { plan, schedule_csv } => {
            let plan = read_plan(&plan)?;
            let result = planner.project(Some(&plan))?;
            if let Some(path) = schedule_csv {
                write_yearly_csv(&path, &result.yearly_projections)?;
            }
            print_json(&result)
        }
        Command::Debts {
            debts,
            extra,
            strategy,
            schedule_csv,
        } => {
            let debts = read_debts(&debts)?;
            let payoff = match strategy {
                Some(strategy) => {
                    let plan = planner.optimize(&debts, extra, strategy)?;
                    print_json(&plan)?;
                    plan
                }
                None => {
                    let comparison = planner.compare(&debts, extra)?;
                    print_json(&comparison)?;
                    comparison.recommended_plan().clone()
                }
            };
            if let Some(path) = schedule_csv {
                write_schedule_csv(&path, &payoff.debts)?;
            }
            Ok(())
        }
        Command::Consolidate { debts, rate, term } => {
            let debts = read_debts(&debts)?;
            let offer = ConsolidationOffer {
                annual_rate_percent: rate,
                term_months: term,
            };
            print_json(&planner.consolidate(&debts, &offer)?)
        }
        Command::MonteCarlo { plan, .. } => {
            let plan = read_plan(&plan)?;
            print_json(&planner.monte_carlo(Some(&plan))?)
        }
        Command::Sensitivity { plan } => {
            let plan = read_plan(&plan)?;
            print_json(&planner.sensitivity(Some(&plan))?)
        }
        Command::WhatIf { plan, scenarios } => {
            let plan = read_plan(&plan)?;
            let scenarios = load_scenarios(&scenarios)
                .map_err(|e| anyhow!("reading scenarios {}: {}", scenarios.display(), e))?;
            print_json(&planner.what_if(Some(&plan), &scenarios)?)
        }
        Command::Prioritize { goals, capacity } => {
            let goals = load_goals(&goals)
                .map_err(|e| anyhow!("reading goals {}: {}", goals.display(), e))?;
            print_json(&planner.prioritize(&goals, capacity)?)
        }
    }
}

fn read_plan(path: &Path) -> Result<RetirementPlan> {
    load_plan(path).map_err(|e| anyhow!("reading plan {}: {}", path.display(), e))
}

fn read_debts(path: &Path) -> Result<Vec<Debt>> {
    let debts = load_debts(path).map_err(|e| anyhow!("reading debts {}: {}", path.display(), e))?;
    info!("loaded {} debts from {}", debts.len(), path.display());
    Ok(debts)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_yearly_csv(path: &Path, years: &[YearlyProjection]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for year in years {
        writer.serialize(year)?;
    }
    writer.flush()?;
    info!("wrote {} yearly rows to {}", years.len(), path.display());
    Ok(())
}

fn write_schedule_csv(path: &Path, debts: &[DebtPayoff]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut rows = 0;
    for debt in debts {
        for entry in &debt.schedule {
            writer.serialize(ScheduleRow {
                debt: &debt.name,
                payoff_order: debt.payoff_order,
                month: entry.month,
                opening_balance: entry.opening_balance,
                interest: entry.interest,
                payment: entry.payment,
                closing_balance: entry.closing_balance,
            })?;
            rows += 1;
        }
    }
    writer.flush()?;
    info!("wrote {} schedule rows to {}", rows, path.display());
    Ok(())
}
