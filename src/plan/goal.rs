//! Financial goal record

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::money::to_f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    EmergencyFund,
    HomePurchase,
    Retirement,
    DebtPayoff,
    Education,
    Vacation,
    Other,
}

impl GoalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalCategory::EmergencyFund => "emergency_fund",
            GoalCategory::HomePurchase => "home_purchase",
            GoalCategory::Retirement => "retirement",
            GoalCategory::DebtPayoff => "debt_payoff",
            GoalCategory::Education => "education",
            GoalCategory::Vacation => "vacation",
            GoalCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    pub category: GoalCategory,
    pub target_amount: Decimal,
    pub timeline_months: u32,
    /// What the household can put toward this goal each month
    pub monthly_capacity: Decimal,
}

impl Goal {
    pub fn new(
        name: impl Into<String>,
        category: GoalCategory,
        target_amount: Decimal,
        timeline_months: u32,
        monthly_capacity: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            target_amount,
            timeline_months,
            monthly_capacity,
        }
    }

    /// Monthly funding needed to hit the target on time
    pub fn required_monthly(&self) -> f64 {
        to_f64(self.target_amount) / self.timeline_months.max(1) as f64
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.target_amount < Decimal::ZERO {
            return Err(EngineError::invalid(
                "target_amount",
                format!("{}: target {} is negative", self.name, self.target_amount),
            ));
        }
        if self.monthly_capacity < Decimal::ZERO {
            return Err(EngineError::invalid(
                "monthly_capacity",
                format!("{}: capacity {} is negative", self.name, self.monthly_capacity),
            ));
        }
        if self.timeline_months == 0 {
            return Err(EngineError::invalid(
                "timeline_months",
                format!("{}: timeline must be at least one month", self.name),
            ));
        }
        Ok(())
    }
}
