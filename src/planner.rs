//! Planner facade over the projection, debt and scenario engines
//!
//! Holds one validated [`EngineConfig`] and hands each call to the engine
//! that owns it.
//!
//! # Example
//! ```ignore
//! let planner = Planner::new(EngineConfig::default().with_env_overrides())?;
//! let projection = planner.project(Some(&plan))?;
//! let odds = planner.monte_carlo(Some(&plan))?;
//! ```

use log::info;
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::debt::{
    ConsolidationAnalysis, ConsolidationOffer, DebtOptimizer, PayoffPlan, Strategy,
    StrategyComparison,
};
use crate::error::{EngineError, EngineResult};
use crate::plan::{Debt, Goal, NamedScenario, RetirementPlan};
use crate::projection::{ProjectionResult, RetirementProjector};
use crate::scenario::{
    prioritize, sensitivity, what_if, MonteCarloReport, MonteCarloSimulator, PrioritizationReport,
    SensitivityReport, WhatIfReport,
};

#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: EngineConfig,
    projector: RetirementProjector,
    optimizer: DebtOptimizer,
}

impl Planner {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            projector: RetirementProjector::new(config.projection.clone()),
            optimizer: DebtOptimizer::new(config.debt.clone()),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn project(&self, plan: Option<&RetirementPlan>) -> EngineResult<ProjectionResult> {
        let plan = plan.ok_or(EngineError::NoPlan)?;
        let result = self.projector.project(plan)?;
        info!(
            "projected plan {:?}: {} years, balance {}, {}",
            plan.plan_id,
            result.years_to_retirement,
            result.projected_retirement_balance,
            result.readiness.as_str()
        );
        Ok(result)
    }

    /// Project many plans in parallel; results keep input order
    pub fn project_batch(&self, plans: &[RetirementPlan]) -> Vec<EngineResult<ProjectionResult>> {
        plans
            .par_iter()
            .map(|plan| self.projector.project(plan))
            .collect()
    }

    pub fn what_if(
        &self,
        plan: Option<&RetirementPlan>,
        scenarios: &[NamedScenario],
    ) -> EngineResult<WhatIfReport> {
        let plan = plan.ok_or(EngineError::NoPlan)?;
        let report = what_if(&self.projector, plan, scenarios)?;
        info!(
            "what-if: {} scenarios, best {:?}, worst {:?}",
            report.scenarios.len(),
            report.summary.best_scenario,
            report.summary.worst_scenario
        );
        Ok(report)
    }

    pub fn monte_carlo(&self, plan: Option<&RetirementPlan>) -> EngineResult<MonteCarloReport> {
        let plan = plan.ok_or(EngineError::NoPlan)?;
        let simulator =
            MonteCarloSimulator::new(self.config.projection.clone(), self.config.monte_carlo.clone());
        let report = simulator.run(plan)?;
        info!(
            "monte carlo: {} trials, success rate {:.1}%",
            report.num_simulations,
            report.success_rate * 100.0
        );
        Ok(report)
    }

    pub fn sensitivity(&self, plan: Option<&RetirementPlan>) -> EngineResult<SensitivityReport> {
        let plan = plan.ok_or(EngineError::NoPlan)?;
        let report = sensitivity(&self.projector, &self.config.sensitivity, plan)?;
        info!(
            "sensitivity: most sensitive {:?}",
            report.most_sensitive_variable.map(|v| v.as_str())
        );
        Ok(report)
    }

    pub fn optimize(
        &self,
        debts: &[Debt],
        extra_payment: Decimal,
        strategy: Strategy,
    ) -> EngineResult<PayoffPlan> {
        let plan = self.optimizer.optimize(debts, extra_payment, strategy)?;
        info!(
            "{}: {} debts paid off in {} months, interest {}",
            strategy,
            plan.debts.len(),
            plan.total_months,
            plan.total_interest
        );
        Ok(plan)
    }

    pub fn compare(&self, debts: &[Debt], extra_payment: Decimal) -> EngineResult<StrategyComparison> {
        let comparison = self.optimizer.compare(debts, extra_payment)?;
        info!("recommended strategy: {}", comparison.recommended);
        Ok(comparison)
    }

    pub fn consolidate(
        &self,
        debts: &[Debt],
        offer: &ConsolidationOffer,
    ) -> EngineResult<ConsolidationAnalysis> {
        let analysis = self.optimizer.consolidate(debts, offer)?;
        info!(
            "consolidation at {}%: beneficial {}",
            offer.annual_rate_percent, analysis.beneficial
        );
        Ok(analysis)
    }

    pub fn prioritize(
        &self,
        goals: &[Goal],
        capacity_override: Option<Decimal>,
    ) -> EngineResult<PrioritizationReport> {
        let report = prioritize(&self.config.priority_weights, goals, capacity_override)?;
        info!(
            "prioritized {} goals, {} potential conflicts",
            report.goals.len(),
            report.trade_offs.potential_conflicts.len()
        );
        Ok(report)
    }
}
