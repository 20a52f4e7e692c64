//! Debt payoff optimization

mod amortization;
mod optimizer;
mod results;
mod strategy;

pub use amortization::{Amortization, PaymentMode, ScheduleEntry, Simulation, Simulator};
pub use optimizer::{DebtConfig, DebtOptimizer};
pub use results::{
    BaselineComparison, ConsolidationAnalysis, ConsolidationOffer, DebtPayoff, PayoffPlan,
    StrategyComparison,
};
pub use strategy::Strategy;
