//! Input records: retirement plans, overrides, debts and goals

mod data;
mod debt;
mod goal;
mod patch;
pub mod loader;

pub use data::{RetirementPlan, MAX_PROJECTION_YEARS};
pub use debt::{Debt, DebtKind, DebtStatus};
pub use goal::{Goal, GoalCategory};
pub use loader::{load_debts, load_goals, load_plan, load_plans, load_scenarios};
pub use patch::{NamedScenario, ScenarioOverride};
