//! Payoff ordering strategies

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::plan::Debt;

/// Which debt receives extra money first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Highest interest rate first
    Avalanche,
    /// Smallest balance first
    Snowball,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Avalanche, Strategy::Snowball];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Avalanche => "AVALANCHE",
            Strategy::Snowball => "SNOWBALL",
        }
    }

    /// Indices into `debts` in priority order
    ///
    /// Ties fall back to the other key, then to input order, so the result
    /// is fully deterministic.
    pub fn order(&self, debts: &[&Debt]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..debts.len()).collect();
        // sort_by is stable, which keeps input order on full ties
        indices.sort_by(|&a, &b| self.compare(debts[a], debts[b]));
        indices
    }

    fn compare(&self, a: &Debt, b: &Debt) -> Ordering {
        match self {
            Strategy::Avalanche => b
                .interest_rate
                .cmp(&a.interest_rate)
                .then_with(|| b.current_balance.cmp(&a.current_balance)),
            Strategy::Snowball => a
                .current_balance
                .cmp(&b.current_balance)
                .then_with(|| b.interest_rate.cmp(&a.interest_rate)),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "avalanche" => Ok(Strategy::Avalanche),
            "snowball" => Ok(Strategy::Snowball),
            other => Err(format!("Unknown strategy: {}", other)),
        }
    }
}
