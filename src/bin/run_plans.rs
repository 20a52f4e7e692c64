//! Project a batch of retirement plans in parallel
//!
//! Usage: run_plans [plans.json] [summary.csv]
//! Writes one summary row per plan; failed plans are reported on stderr.

use std::env;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use finsim::plan::load_plans;
use finsim::projection::ProjectionSummary;
use finsim::{EngineConfig, Planner, Readiness};

fn main() -> Result<()> {
    env_logger::init();

    let input = env::args().nth(1).unwrap_or_else(|| "plans.json".to_string());
    let output = env::args()
        .nth(2)
        .unwrap_or_else(|| "plan_summary.csv".to_string());

    let start = Instant::now();
    println!("Loading plans from {}...", input);
    let plans = load_plans(&input).map_err(|e| anyhow!("reading plans {}: {}", input, e))?;
    println!("Loaded {} plans in {:?}", plans.len(), start.elapsed());

    let planner = Planner::new(EngineConfig::default().with_env_overrides())
        .context("invalid engine configuration")?;

    println!("Running projections...");
    let proj_start = Instant::now();
    let results = planner.project_batch(&plans);
    println!("Projections complete in {:?}", proj_start.elapsed());

    let mut writer =
        csv::Writer::from_path(&output).with_context(|| format!("creating {}", output))?;
    let mut failed = 0;
    let mut counts = [0usize; 3];
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(result) => {
                let summary: ProjectionSummary = result.summary();
                counts[match summary.readiness {
                    Readiness::OnTrack => 0,
                    Readiness::NeedsImprovement => 1,
                    Readiness::Behind => 2,
                }] += 1;
                writer.serialize(summary)?;
            }
            Err(e) => {
                failed += 1;
                eprintln!("plan #{} ({:?}): {}", i + 1, plans[i].plan_id, e);
            }
        }
    }
    writer.flush()?;

    println!("\nSummary written to: {}", output);
    println!("  Plans:             {}", plans.len());
    println!("  On track:          {}", counts[0]);
    println!("  Needs improvement: {}", counts[1]);
    println!("  Behind:            {}", counts[2]);
    println!("  Failed:            {}", failed);
    println!("Total time: {:?}", start.elapsed());
    Ok(())
}
