//! Core projection engine for yearly retirement balance projections

use log::debug;
use serde::{Deserialize, Serialize};

use super::results::{ProjectionResult, Readiness, RetirementBreakdown, YearlyProjection};
use super::state::AccumulationState;
use crate::error::{EngineError, EngineResult};
use crate::money::{
    compound_factor, monthly_effective_rate, round_rate, sinking_fund_payment, to_f64, to_money,
};
use crate::plan::RetirementPlan;

const MONTHS_PER_YEAR: u32 = 12;

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Safe withdrawal rate applied to the retirement balance
    pub withdrawal_rate: f64,

    /// Withdrawal rate used when retirement lasts longer than `long_retirement_years`
    pub long_retirement_withdrawal_rate: f64,

    pub long_retirement_years: u32,

    /// Income/required ratio at or above which a plan is ON_TRACK
    pub on_track_threshold: f64,

    /// Income/required ratio at or above which a plan NEEDS_IMPROVEMENT
    pub needs_improvement_threshold: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            withdrawal_rate: 0.04,
            long_retirement_withdrawal_rate: 0.035,
            long_retirement_years: 30,
            on_track_threshold: 0.95,
            needs_improvement_threshold: 0.70,
        }
    }
}

impl ProjectionConfig {
    /// Lower withdrawal rates for cautious planning
    pub fn conservative() -> Self {
        Self {
            withdrawal_rate: 0.035,
            long_retirement_withdrawal_rate: 0.03,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        for (field, rate) in [
            ("withdrawal_rate", self.withdrawal_rate),
            ("long_retirement_withdrawal_rate", self.long_retirement_withdrawal_rate),
        ] {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(EngineError::invalid(field, format!("{} is outside (0, 1]", rate)));
            }
        }
        if !(self.needs_improvement_threshold >= 0.0
            && self.needs_improvement_threshold <= self.on_track_threshold)
        {
            return Err(EngineError::invalid(
                "needs_improvement_threshold",
                "must be between 0 and on_track_threshold",
            ));
        }
        Ok(())
    }
}

/// Unrounded end-of-year position produced by [`accumulate`]
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedYear {
    pub year: u32,
    pub age: u32,
    pub tax_deferred: f64,
    pub individual: f64,
    pub other: f64,
    pub contributions: f64,
    pub employer_match: f64,
}

impl AccumulatedYear {
    fn capture(state: &AccumulationState) -> Self {
        Self {
            year: state.year,
            age: state.age,
            tax_deferred: state.tax_deferred,
            individual: state.individual,
            other: state.other,
            contributions: state.ytd_contributions,
            employer_match: state.ytd_match,
        }
    }

    pub fn total(&self) -> f64 {
        self.tax_deferred + self.individual + self.other
    }
}

/// Year-by-year accumulation path of a plan
#[derive(Debug, Clone)]
pub struct Accumulation {
    pub years: Vec<AccumulatedYear>,
}

impl Accumulation {
    pub fn final_balance(&self) -> f64 {
        self.years.last().map(|y| y.total()).unwrap_or(0.0)
    }

    pub fn total_contributions(&self) -> f64 {
        self.years.iter().map(|y| y.contributions).sum()
    }

    pub fn total_match(&self) -> f64 {
        self.years.iter().map(|y| y.employer_match).sum()
    }
}

/// Run the monthly accumulation loop with one annual return per year
///
/// `annual_returns[y]` drives year `y + 1`; it must hold at least
/// `years_to_retirement` entries. The deterministic projection passes the
/// plan's expected return for every year, Monte Carlo passes sampled ones.
pub fn accumulate(plan: &RetirementPlan, annual_returns: &[f64]) -> EngineResult<Accumulation> {
    let n = plan.years_to_retirement() as usize;
    if annual_returns.len() < n {
        return Err(EngineError::invalid(
            "annual_returns",
            format!("{} returns supplied for {} years", annual_returns.len(), n),
        ));
    }

    let income = to_f64(plan.current_annual_income);
    let mut state = AccumulationState::from_plan(plan);
    let mut years = Vec::with_capacity(n + 1);
    years.push(AccumulatedYear::capture(&state));

    for &annual in &annual_returns[..n] {
        if !annual.is_finite() || annual <= -1.0 {
            return Err(EngineError::invalid(
                "annual_returns",
                format!("return {} cannot be compounded", annual),
            ));
        }
        let monthly_rate = monthly_effective_rate(annual);

        state.begin_year();
        for _month in 0..MONTHS_PER_YEAR {
            state.advance_month(monthly_rate);
        }

        let employer_match =
            (plan.employer_match_rate * state.ytd_401k).min(plan.employer_match_limit * income);
        state.credit_match(employer_match.max(0.0));

        years.push(AccumulatedYear::capture(&state));
    }

    Ok(Accumulation { years })
}

/// Income figures for a final balance, before any rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub final_balance: f64,
    pub monthly_income: f64,
    pub required_income: f64,
}

impl Outcome {
    pub fn shortfall(&self) -> f64 {
        (self.required_income - self.monthly_income).max(0.0)
    }

    pub fn meets_target(&self) -> bool {
        self.monthly_income >= self.required_income
    }
}

/// Deterministic retirement projector
#[derive(Debug, Clone, Default)]
pub struct RetirementProjector {
    config: ProjectionConfig,
}

impl RetirementProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Withdrawal rate for the plan's retirement span
    pub fn withdrawal_rate(&self, plan: &RetirementPlan) -> f64 {
        if plan.retirement_years() > self.config.long_retirement_years {
            self.config.long_retirement_withdrawal_rate
        } else {
            self.config.withdrawal_rate
        }
    }

    /// Monthly income the plan needs at retirement, in retirement-year dollars
    pub fn required_monthly_income(&self, plan: &RetirementPlan) -> f64 {
        plan.monthly_income()
            * plan.desired_replacement_ratio
            * compound_factor(plan.expected_inflation_rate, plan.years_to_retirement())
    }

    /// Monthly income supported by `balance` plus social security
    pub fn monthly_income(&self, plan: &RetirementPlan, balance: f64) -> f64 {
        balance * self.withdrawal_rate(plan) / 12.0 + to_f64(plan.social_security_benefit)
    }

    pub fn classify(&self, monthly_income: f64, required_income: f64) -> Readiness {
        if required_income <= 0.0 {
            return Readiness::OnTrack;
        }
        let ratio = monthly_income / required_income;
        if ratio >= self.config.on_track_threshold {
            Readiness::OnTrack
        } else if ratio >= self.config.needs_improvement_threshold {
            Readiness::NeedsImprovement
        } else {
            Readiness::Behind
        }
    }

    /// Final balance and income for a given return path
    ///
    /// The plan is assumed valid; callers validate once before looping.
    pub fn outcome(&self, plan: &RetirementPlan, annual_returns: &[f64]) -> EngineResult<Outcome> {
        let accumulation = accumulate(plan, annual_returns)?;
        let final_balance = accumulation.final_balance();
        Ok(Outcome {
            final_balance,
            monthly_income: self.monthly_income(plan, final_balance),
            required_income: self.required_monthly_income(plan),
        })
    }

    /// Project a plan at its expected return
    pub fn project(&self, plan: &RetirementPlan) -> EngineResult<ProjectionResult> {
        plan.validate()?;

        let n = plan.years_to_retirement();
        debug!(
            "projecting plan {:?}: {} years at {:.4}",
            plan.plan_id, n, plan.expected_annual_return
        );

        let returns = vec![plan.expected_annual_return; n as usize];
        let accumulation = accumulate(plan, &returns)?;

        let final_balance = accumulation.final_balance();
        let withdrawal_rate = self.withdrawal_rate(plan);
        let monthly_income = self.monthly_income(plan, final_balance);
        let required_income = self.required_monthly_income(plan);
        let shortfall = (required_income - monthly_income).max(0.0);

        let current_monthly = plan.monthly_income();
        let replacement_ratio = if current_monthly > 0.0 {
            round_rate(monthly_income / current_monthly)
        } else {
            0.0
        };

        let recommended_monthly_savings = if shortfall > 0.0 && n > 0 {
            let lump_sum = shortfall * 12.0 / withdrawal_rate;
            let monthly_rate = monthly_effective_rate(plan.expected_annual_return);
            Some(to_money(sinking_fund_payment(
                lump_sum,
                monthly_rate,
                n * MONTHS_PER_YEAR,
            )))
        } else {
            None
        };

        let breakdown = self.breakdown(plan, &accumulation, monthly_income);

        let yearly_projections = accumulation
            .years
            .iter()
            .map(|y| YearlyProjection {
                year: y.year,
                age: y.age,
                tax_deferred_balance: to_money(y.tax_deferred),
                individual_balance: to_money(y.individual),
                other_balance: to_money(y.other),
                total_balance: to_money(y.total()),
                employee_contributions: to_money(y.contributions),
                employer_match: to_money(y.employer_match),
            })
            .collect();

        Ok(ProjectionResult {
            plan_id: plan.plan_id,
            years_to_retirement: n,
            projected_retirement_balance: to_money(final_balance),
            monthly_retirement_income: to_money(monthly_income),
            required_monthly_income: to_money(required_income),
            replacement_ratio,
            withdrawal_rate,
            readiness: self.classify(monthly_income, required_income),
            income_shortfall: to_money(shortfall),
            recommended_monthly_savings,
            yearly_projections,
            breakdown,
        })
    }

    fn breakdown(
        &self,
        plan: &RetirementPlan,
        accumulation: &Accumulation,
        monthly_income: f64,
    ) -> RetirementBreakdown {
        let last = accumulation.years.last();
        let contributions = accumulation.total_contributions();
        let employer_match = accumulation.total_match();
        let growth = accumulation.final_balance()
            - to_f64(plan.total_current_balance())
            - contributions
            - employer_match;
        let deflator = compound_factor(plan.expected_inflation_rate, plan.years_to_retirement());

        RetirementBreakdown {
            tax_deferred_balance: to_money(last.map(|y| y.tax_deferred).unwrap_or(0.0)),
            individual_balance: to_money(last.map(|y| y.individual).unwrap_or(0.0)),
            other_balance: to_money(last.map(|y| y.other).unwrap_or(0.0)),
            total_employee_contributions: to_money(contributions),
            total_employer_match: to_money(employer_match),
            investment_growth: to_money(growth),
            monthly_social_security: plan.social_security_benefit,
            inflation_adjusted_annual_income: to_money(monthly_income * 12.0 / deflator),
        }
    }
}
