//! Error types shared by all engines
//!
//! Every engine entry point returns `Result<_, EngineError>`. Failures are
//! detected before any output record is built, so callers never receive a
//! partially computed result.

use thiserror::Error;

/// Failure reported by an engine entry point
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// An input field is missing or out of range
    #[error("invalid input for '{field}': {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },

    /// An amortization loop hit its iteration guard before reaching zero
    #[error("{subject} does not amortize under the given inputs (gave up after {months} months)")]
    NonConvergence {
        subject: String,
        months: u32,
    },

    /// The debt list had no active balances
    #[error("nothing to optimize: no active debts with a positive balance")]
    NothingToOptimize,

    /// The caller had no plan to hand over
    #[error("no plan available for projection")]
    NoPlan,
}

impl EngineError {
    /// Shorthand for an `InvalidInput` error
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message_names_field() {
        let err = EngineError::invalid("retirement_age", "must not be below current_age");
        assert_eq!(
            err.to_string(),
            "invalid input for 'retirement_age': must not be below current_age"
        );
    }

    #[test]
    fn test_non_convergence_message() {
        let err = EngineError::NonConvergence {
            subject: "debt set".to_string(),
            months: 1200,
        };
        assert!(err.to_string().contains("1200 months"));
    }
}
