//! Scenario analysis over retirement plans and goal sets

mod monte_carlo;
mod prioritization;
mod sensitivity;
mod stats;
mod what_if;

pub use monte_carlo::{
    derive_seed, standard_normal, MonteCarloConfig, MonteCarloReport, MonteCarloSimulator,
    ReturnModel, RiskMetrics, MAX_SIMULATIONS,
};
pub use prioritization::{
    cost_score, feasibility_score, impact_score, prioritize, urgency_score, PrioritizationReport,
    PriorityLevel, PriorityWeights, ScoredGoal, TradeOffAnalysis,
};
pub use sensitivity::{
    sensitivity, SensitivityConfig, SensitivityLevel, SensitivityReport, SensitivityVariable,
    VariableSensitivity,
};
pub use stats::{IncomePercentiles, Percentiles, SummaryStats};
pub use what_if::{what_if, ScenarioOutcome, WhatIfReport, WhatIfSummary};
