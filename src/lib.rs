//! finsim - Financial simulation engine for personal-finance planning
//!
//! This library provides:
//! - Retirement balance projections with employer match and inflation
//! - Debt payoff optimization (avalanche, snowball, consolidation)
//! - What-if scenarios, Monte Carlo simulation and sensitivity analysis
//! - Goal prioritization
//!
//! Engine entry points are pure functions over immutable input records.
//! File access is confined to `plan::loader` and `EngineConfig::from_json_path`.

pub mod config;
pub mod debt;
pub mod error;
pub mod money;
pub mod plan;
pub mod planner;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use config::EngineConfig;
pub use debt::{DebtOptimizer, PayoffPlan, Strategy, StrategyComparison};
pub use error::{EngineError, EngineResult};
pub use plan::{Debt, Goal, GoalCategory, NamedScenario, RetirementPlan, ScenarioOverride};
pub use planner::Planner;
pub use projection::{ProjectionResult, Readiness, RetirementProjector};
pub use scenario::{MonteCarloReport, MonteCarloSimulator};
