//! Monte Carlo simulation of retirement outcomes
//!
//! Each trial draws one annual return per accumulation year and reruns the
//! deterministic accumulation loop with that path. Trials fan out over rayon
//! with an independently seeded RNG each, so a fixed seed gives the same
//! report regardless of thread count.

use std::f64::consts::PI;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::stats::{sorted, IncomePercentiles, Percentiles, SummaryStats};
use crate::error::{EngineError, EngineResult};
use crate::money::{round_rate, to_money};
use crate::plan::RetirementPlan;
use crate::projection::{Outcome, ProjectionConfig, RetirementProjector};

/// Largest number of trials accepted in one run
pub const MAX_SIMULATIONS: u32 = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub num_simulations: u32,

    /// Base seed; trial `i` uses a seed mixed from this and `i`
    pub seed: u64,

    /// Standard deviation of the annual return around the plan's expected return
    pub return_std_dev: f64,

    pub return_floor: f64,

    pub return_ceiling: f64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            num_simulations: 1000,
            seed: 42,
            return_std_dev: 0.15,
            return_floor: -0.40,
            return_ceiling: 0.60,
        }
    }
}

impl MonteCarloConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.num_simulations == 0 || self.num_simulations > MAX_SIMULATIONS {
            return Err(EngineError::invalid(
                "num_simulations",
                format!(
                    "{} is outside 1-{}",
                    self.num_simulations, MAX_SIMULATIONS
                ),
            ));
        }
        if !(self.return_std_dev.is_finite() && self.return_std_dev >= 0.0) {
            return Err(EngineError::invalid(
                "return_std_dev",
                format!("{} is not a non-negative number", self.return_std_dev),
            ));
        }
        if !(self.return_floor > -1.0 && self.return_floor < self.return_ceiling) {
            return Err(EngineError::invalid(
                "return_floor",
                format!(
                    "[{}, {}] is not a usable return range",
                    self.return_floor, self.return_ceiling
                ),
            ));
        }
        Ok(())
    }
}

/// Clamped normal distribution of annual returns
#[derive(Debug, Clone, Copy)]
pub struct ReturnModel {
    pub mean: f64,
    pub std_dev: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl ReturnModel {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        (self.mean + self.std_dev * standard_normal(rng)).clamp(self.floor, self.ceiling)
    }
}

/// Box-Muller draw from N(0, 1)
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-12);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Seed for one trial, mixed from the base seed and the trial index
pub fn derive_seed(base_seed: u64, trial: u32) -> u64 {
    splitmix64(base_seed ^ (u64::from(trial) << 32) ^ u64::from(trial))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// 5th-percentile final balance
    pub value_at_risk_5: Decimal,
    /// Fraction of trials whose income falls short of the requirement
    pub shortfall_probability: f64,
    /// Mean shortfall among the failing trials
    pub average_shortfall: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloReport {
    pub num_simulations: u32,
    pub seed: u64,
    pub return_mean: f64,
    pub return_std_dev: f64,
    pub required_monthly_income: Decimal,
    /// Fraction of trials meeting the income requirement
    pub success_rate: f64,
    pub balance_statistics: SummaryStats,
    pub income_statistics: SummaryStats,
    pub percentiles: Percentiles,
    pub income_percentiles: IncomePercentiles,
    pub risk_metrics: RiskMetrics,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MonteCarloSimulator {
    projector: RetirementProjector,
    config: MonteCarloConfig,
}

impl MonteCarloSimulator {
    pub fn new(projection: ProjectionConfig, config: MonteCarloConfig) -> Self {
        Self {
            projector: RetirementProjector::new(projection),
            config,
        }
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Run with the default per-trial `StdRng`
    pub fn run(&self, plan: &RetirementPlan) -> EngineResult<MonteCarloReport> {
        let seed = self.config.seed;
        self.run_with_rng(plan, |trial| StdRng::seed_from_u64(derive_seed(seed, trial)))
    }

    /// Run with RNGs produced by `make_rng(trial_index)`
    pub fn run_with_rng<R, F>(&self, plan: &RetirementPlan, make_rng: F) -> EngineResult<MonteCarloReport>
    where
        R: Rng,
        F: Fn(u32) -> R + Sync,
    {
        plan.validate()?;
        self.config.validate()?;

        let years = plan.years_to_retirement() as usize;
        let model = ReturnModel {
            mean: plan.expected_annual_return,
            std_dev: self.config.return_std_dev,
            floor: self.config.return_floor,
            ceiling: self.config.return_ceiling,
        };
        debug!(
            "monte carlo: {} trials x {} years, mean {:.4}, sd {:.4}",
            self.config.num_simulations, years, model.mean, model.std_dev
        );

        // Fan out; collect keeps trial order
        let outcomes: Vec<Outcome> = (0..self.config.num_simulations)
            .into_par_iter()
            .map(|trial| {
                let mut rng = make_rng(trial);
                let returns: Vec<f64> = (0..years).map(|_| model.sample(&mut rng)).collect();
                self.projector.outcome(plan, &returns)
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(self.aggregate(plan, &outcomes))
    }

    fn aggregate(&self, plan: &RetirementPlan, outcomes: &[Outcome]) -> MonteCarloReport {
        let n = outcomes.len() as f64;
        let required = self.projector.required_monthly_income(plan);

        let balances: Vec<f64> = outcomes.iter().map(|o| o.final_balance).collect();
        let incomes: Vec<f64> = outcomes.iter().map(|o| o.monthly_income).collect();
        let sorted_balances = sorted(&balances);
        let sorted_incomes = sorted(&incomes);

        let successes = outcomes.iter().filter(|o| o.meets_target()).count();
        let shortfalls: Vec<f64> = outcomes
            .iter()
            .filter(|o| !o.meets_target())
            .map(Outcome::shortfall)
            .collect();

        let success_rate = successes as f64 / n;
        let shortfall_probability = shortfalls.len() as f64 / n;
        let average_shortfall = if shortfalls.is_empty() {
            0.0
        } else {
            shortfalls.iter().sum::<f64>() / shortfalls.len() as f64
        };

        let percentiles = Percentiles::from_sorted(&sorted_balances);
        let risk_metrics = RiskMetrics {
            value_at_risk_5: percentiles.p5,
            shortfall_probability: round_rate(shortfall_probability),
            average_shortfall: to_money(average_shortfall),
        };

        MonteCarloReport {
            num_simulations: self.config.num_simulations,
            seed: self.config.seed,
            return_mean: plan.expected_annual_return,
            return_std_dev: self.config.return_std_dev,
            required_monthly_income: to_money(required),
            success_rate: round_rate(success_rate),
            balance_statistics: SummaryStats::from_values(&balances),
            income_statistics: SummaryStats::from_values(&incomes),
            percentiles,
            income_percentiles: IncomePercentiles::from_sorted(&sorted_incomes),
            risk_metrics,
            recommendations: recommendations(success_rate, shortfall_probability),
        }
    }
}

fn recommendations(success_rate: f64, shortfall_probability: f64) -> Vec<String> {
    let mut out = Vec::new();
    if success_rate < 0.70 {
        out.push("Consider increasing your retirement contributions to improve the success rate".to_string());
    }
    if shortfall_probability > 0.30 {
        out.push("High shortfall risk detected - consider more conservative planning assumptions".to_string());
    }
    if success_rate > 0.90 {
        out.push("Excellent retirement readiness - consider optimizing for tax efficiency".to_string());
    }
    out.push("Review and adjust your plan annually based on market conditions and life changes".to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::accumulate;
    use rand::rngs::mock::StepRng;
    use rust_decimal_macros::dec;

    fn plan() -> RetirementPlan {
        RetirementPlan {
            current_401k_balance: dec!(25000),
            monthly_401k_contribution: dec!(500),
            employer_match_rate: 0.5,
            employer_match_limit: 0.06,
            ..RetirementPlan::new(30, 65, dec!(75000))
        }
    }

    fn simulator(num_simulations: u32, return_std_dev: f64) -> MonteCarloSimulator {
        MonteCarloSimulator::new(
            ProjectionConfig::default(),
            MonteCarloConfig {
                num_simulations,
                return_std_dev,
                ..MonteCarloConfig::default()
            },
        )
    }

    #[test]
    fn test_zero_variance_matches_deterministic_projection() {
        let plan = plan();
        let deterministic = RetirementProjector::default().project(&plan).unwrap();
        let report = simulator(50, 0.0).run(&plan).unwrap();

        let expected = deterministic.projected_retirement_balance;
        assert_eq!(report.balance_statistics.min, expected);
        assert_eq!(report.balance_statistics.max, expected);
        assert_eq!(report.balance_statistics.standard_deviation, Decimal::ZERO);
        assert_eq!(report.percentiles.p5, expected);
        assert_eq!(report.percentiles.p95, expected);
    }

    #[test]
    fn test_percentiles_are_ordered() {
        let report = simulator(500, 0.15).run(&plan()).unwrap();
        let p = &report.percentiles;
        assert!(p.p5 <= p.p10);
        assert!(p.p10 <= p.p25);
        assert!(p.p25 <= p.p50);
        assert!(p.p50 <= p.p75);
        assert!(p.p75 <= p.p90);
        assert!(p.p90 <= p.p95);
        assert!(report.balance_statistics.min <= p.p5);
        assert!(p.p95 <= report.balance_statistics.max);
        assert_eq!(report.risk_metrics.value_at_risk_5, p.p5);
        assert!(report.income_percentiles.p5 <= report.income_percentiles.p95);
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let first = simulator(200, 0.15).run(&plan()).unwrap();
        let second = simulator(200, 0.15).run(&plan()).unwrap();
        assert_eq!(first, second);

        let other_seed = MonteCarloSimulator::new(
            ProjectionConfig::default(),
            MonteCarloConfig {
                num_simulations: 200,
                seed: 7,
                ..MonteCarloConfig::default()
            },
        )
        .run(&plan())
        .unwrap();
        assert_ne!(first.balance_statistics, other_seed.balance_statistics);
    }

    #[test]
    fn test_success_and_shortfall_are_complementary() {
        let report = simulator(300, 0.15).run(&plan()).unwrap();
        assert!((0.0..=1.0).contains(&report.success_rate));
        assert!((report.success_rate + report.risk_metrics.shortfall_probability - 1.0).abs() < 1e-3);
        assert!(report
            .recommendations
            .last()
            .unwrap()
            .starts_with("Review and adjust"));
    }

    #[test]
    fn test_injected_rng_drives_the_draws() {
        // A constant zero source pushes every draw to the ceiling
        let plan = plan();
        let report = simulator(10, 0.15)
            .run_with_rng(&plan, |_| StepRng::new(0, 0))
            .unwrap();

        let ceiling = MonteCarloConfig::default().return_ceiling;
        let path = vec![ceiling; plan.years_to_retirement() as usize];
        let expected = accumulate(&plan, &path).unwrap().final_balance();
        assert_eq!(report.balance_statistics.min, to_money(expected));
        assert_eq!(report.success_rate, 1.0);
    }

    #[test]
    fn test_simulation_count_bounds() {
        assert!(matches!(
            simulator(0, 0.15).run(&plan()),
            Err(EngineError::InvalidInput { field: "num_simulations", .. })
        ));
        assert!(simulator(MAX_SIMULATIONS + 1, 0.15).run(&plan()).is_err());
    }

    #[test]
    fn test_recommendation_thresholds() {
        let low = recommendations(0.5, 0.5);
        assert_eq!(low.len(), 3);
        assert!(low[0].contains("increasing your retirement contributions"));

        let high = recommendations(0.95, 0.05);
        assert_eq!(high.len(), 2);
        assert!(high[0].contains("tax efficiency"));
    }

    #[test]
    fn test_derive_seed_differs_per_trial() {
        assert_ne!(derive_seed(42, 0), derive_seed(42, 1));
        assert_ne!(derive_seed(42, 0), derive_seed(43, 0));
        assert_eq!(derive_seed(42, 5), derive_seed(42, 5));
    }
}
