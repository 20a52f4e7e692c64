//! Output records for debt payoff analysis

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amortization::ScheduleEntry;
use super::strategy::Strategy;
use crate::plan::DebtKind;

/// Payoff outcome for one debt under a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayoff {
    pub name: String,
    pub kind: DebtKind,
    /// 1-based position in the strategy's priority order
    pub payoff_order: usize,
    pub starting_balance: Decimal,
    pub interest_rate: Decimal,
    pub minimum_payment: Decimal,
    pub months_to_payoff: u32,
    pub total_interest: Decimal,
    pub total_paid: Decimal,
    pub schedule: Vec<ScheduleEntry>,
}

/// Strategy run compared with paying only the minimums
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineComparison {
    /// False when minimums alone never retire the debts
    pub converges: bool,
    pub months: Option<u32>,
    pub total_interest: Option<Decimal>,
    pub total_paid: Option<Decimal>,
    pub interest_saved: Option<Decimal>,
    pub months_saved: Option<i64>,
    pub recommendation: String,
}

/// Full payoff plan for a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffPlan {
    pub strategy: Strategy,
    /// Debts in priority order
    pub debts: Vec<DebtPayoff>,
    pub total_debt: Decimal,
    pub total_minimum_payments: Decimal,
    pub extra_payment: Decimal,
    pub monthly_payment: Decimal,
    pub total_months: u32,
    pub total_interest: Decimal,
    pub total_paid: Decimal,
    pub baseline: BaselineComparison,
}

impl PayoffPlan {
    /// Month the first debt is cleared
    pub fn first_payoff_month(&self) -> u32 {
        self.debts.iter().map(|d| d.months_to_payoff).min().unwrap_or(0)
    }

    /// Debt names in the order they are fully repaid
    pub fn payoff_sequence(&self) -> Vec<&str> {
        let mut debts: Vec<&DebtPayoff> = self.debts.iter().collect();
        debts.sort_by_key(|d| (d.months_to_payoff, d.payoff_order));
        debts.into_iter().map(|d| d.name.as_str()).collect()
    }
}

/// Avalanche vs. snowball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub avalanche: PayoffPlan,
    pub snowball: PayoffPlan,
    pub recommended: Strategy,
    pub reason: String,
    /// Snowball interest minus avalanche interest
    pub interest_difference: Decimal,
    /// Snowball months minus avalanche months
    pub months_difference: i64,
}

impl StrategyComparison {
    pub fn recommended_plan(&self) -> &PayoffPlan {
        match self.recommended {
            Strategy::Avalanche => &self.avalanche,
            Strategy::Snowball => &self.snowball,
        }
    }
}

/// A consolidation loan on offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationOffer {
    /// Annual percentage rate (7.5 = 7.5%)
    pub annual_rate_percent: Decimal,
    /// Fixed term; without one the loan is paid at the current summed minimums
    #[serde(default)]
    pub term_months: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationAnalysis {
    pub total_balance: Decimal,
    /// Balance-weighted average APR of the current debts
    pub current_weighted_rate: Decimal,
    pub consolidated_rate: Decimal,
    pub current_monthly_payment: Decimal,
    pub consolidated_monthly_payment: Decimal,
    pub monthly_savings: Decimal,
    pub current_total_interest: Decimal,
    pub consolidated_total_interest: Decimal,
    pub interest_savings: Decimal,
    pub current_months: u32,
    pub consolidated_months: u32,
    pub time_savings_months: i64,
    pub beneficial: bool,
    pub recommendation: String,
    pub benefits: Vec<String>,
    pub considerations: Vec<String>,
}
