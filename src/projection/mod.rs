//! Retirement projection: yearly accumulation, income and readiness

mod engine;
mod results;
mod state;

pub use engine::{
    accumulate, Accumulation, AccumulatedYear, Outcome, ProjectionConfig, RetirementProjector,
};
pub use results::{
    ProjectionResult, ProjectionSummary, Readiness, RetirementBreakdown, YearlyProjection,
};
pub use state::AccumulationState;
