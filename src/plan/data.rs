//! Retirement plan record

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::money::{round_currency, to_f64};

/// Longest accumulation span the projector accepts
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// A retirement plan as supplied by the caller
///
/// Money fields are cent-precision `Decimal`s, rates are fractions
/// (0.07 = 7%). The engine treats a plan as a value and never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementPlan {
    /// Caller's identifier, echoed in results
    #[serde(default)]
    pub plan_id: Option<u64>,

    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,

    pub current_annual_income: Decimal,

    /// Target retirement income as a fraction of current income (0-2.0)
    pub desired_replacement_ratio: f64,

    /// Tax-deferred bucket (401k)
    #[serde(default)]
    pub current_401k_balance: Decimal,

    /// Individual retirement bucket (IRA)
    #[serde(default)]
    pub current_ira_balance: Decimal,

    /// Everything else; grows without contributions
    #[serde(default)]
    pub other_retirement_savings: Decimal,

    #[serde(default)]
    pub monthly_401k_contribution: Decimal,

    #[serde(default)]
    pub monthly_ira_contribution: Decimal,

    /// Employer match per dollar contributed (0-1.0)
    #[serde(default)]
    pub employer_match_rate: f64,

    /// Cap on the match as a fraction of income (0-1.0)
    #[serde(default)]
    pub employer_match_limit: f64,

    pub expected_annual_return: f64,

    pub expected_inflation_rate: f64,

    /// Monthly social-security-equivalent benefit
    #[serde(default)]
    pub social_security_benefit: Decimal,
}

impl Default for RetirementPlan {
    fn default() -> Self {
        Self {
            plan_id: None,
            current_age: 30,
            retirement_age: 65,
            life_expectancy: 90,
            current_annual_income: Decimal::ZERO,
            desired_replacement_ratio: 0.8,
            current_401k_balance: Decimal::ZERO,
            current_ira_balance: Decimal::ZERO,
            other_retirement_savings: Decimal::ZERO,
            monthly_401k_contribution: Decimal::ZERO,
            monthly_ira_contribution: Decimal::ZERO,
            employer_match_rate: 0.0,
            employer_match_limit: 0.0,
            expected_annual_return: 0.07,
            expected_inflation_rate: 0.03,
            social_security_benefit: Decimal::ZERO,
        }
    }
}

impl RetirementPlan {
    /// Create a plan with the given ages and income; everything else defaults
    pub fn new(current_age: u32, retirement_age: u32, current_annual_income: Decimal) -> Self {
        Self {
            current_age,
            retirement_age,
            life_expectancy: retirement_age.max(current_age) + 25,
            current_annual_income,
            ..Default::default()
        }
    }

    /// Years of accumulation (N)
    pub fn years_to_retirement(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    /// Years spent drawing down
    pub fn retirement_years(&self) -> u32 {
        self.life_expectancy.saturating_sub(self.retirement_age)
    }

    /// Current monthly income as f64
    pub fn monthly_income(&self) -> f64 {
        to_f64(self.current_annual_income) / 12.0
    }

    /// Sum of the three starting balances
    pub fn total_current_balance(&self) -> Decimal {
        self.current_401k_balance + self.current_ira_balance + self.other_retirement_savings
    }

    /// Share of income currently sent to the tax-deferred bucket
    pub fn contribution_rate(&self) -> f64 {
        let income = to_f64(self.current_annual_income);
        if income <= 0.0 {
            0.0
        } else {
            to_f64(self.monthly_401k_contribution) * 12.0 / income
        }
    }

    /// Reject out-of-range fields before any simulation starts
    pub fn validate(&self) -> EngineResult<()> {
        if self.retirement_age < self.current_age {
            return Err(EngineError::invalid(
                "retirement_age",
                format!(
                    "retirement age {} is below current age {}",
                    self.retirement_age, self.current_age
                ),
            ));
        }
        if self.years_to_retirement() > MAX_PROJECTION_YEARS {
            return Err(EngineError::invalid(
                "retirement_age",
                format!("more than {} years to retirement", MAX_PROJECTION_YEARS),
            ));
        }
        if self.life_expectancy <= self.retirement_age {
            return Err(EngineError::invalid(
                "life_expectancy",
                format!(
                    "life expectancy {} must exceed retirement age {}",
                    self.life_expectancy, self.retirement_age
                ),
            ));
        }

        let money = [
            ("current_annual_income", self.current_annual_income),
            ("current_401k_balance", self.current_401k_balance),
            ("current_ira_balance", self.current_ira_balance),
            ("other_retirement_savings", self.other_retirement_savings),
            ("monthly_401k_contribution", self.monthly_401k_contribution),
            ("monthly_ira_contribution", self.monthly_ira_contribution),
            ("social_security_benefit", self.social_security_benefit),
        ];
        for (field, amount) in money {
            if amount < Decimal::ZERO {
                return Err(EngineError::invalid(field, format!("{} is negative", amount)));
            }
        }

        check_range("desired_replacement_ratio", self.desired_replacement_ratio, 0.0, 2.0)?;
        check_range("employer_match_rate", self.employer_match_rate, 0.0, 1.0)?;
        check_range("employer_match_limit", self.employer_match_limit, 0.0, 1.0)?;
        check_range("expected_annual_return", self.expected_annual_return, 0.0, 0.5)?;
        check_range("expected_inflation_rate", self.expected_inflation_rate, 0.0, 0.2)?;

        Ok(())
    }

    /// Monthly 401k amount for a contribution rate expressed as a share of income
    pub fn contribution_for_rate(&self, rate: f64) -> Decimal {
        let rate = Decimal::try_from(rate).unwrap_or(Decimal::ZERO);
        round_currency(self.current_annual_income * rate / dec!(12))
    }
}

/// Inclusive range check for a rate field
pub(crate) fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> EngineResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(EngineError::invalid(
            field,
            format!("{} is outside [{}, {}]", value, min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_plan() -> RetirementPlan {
        RetirementPlan {
            current_401k_balance: dec!(25000),
            monthly_401k_contribution: dec!(500),
            ..RetirementPlan::new(30, 65, dec!(75000))
        }
    }

    #[test]
    fn test_valid_plan_passes() {
        assert!(base_plan().validate().is_ok());
    }

    #[test]
    fn test_retirement_age_below_current_rejected() {
        let plan = RetirementPlan {
            retirement_age: 29,
            ..base_plan()
        };
        match plan.validate() {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "retirement_age"),
            other => panic!("expected invalid retirement_age, got {:?}", other),
        }
    }

    #[test]
    fn test_already_retired_is_allowed() {
        let plan = RetirementPlan {
            retirement_age: 30,
            life_expectancy: 85,
            ..base_plan()
        };
        assert!(plan.validate().is_ok());
        assert_eq!(plan.years_to_retirement(), 0);
    }

    #[test]
    fn test_negative_balance_rejected() {
        let plan = RetirementPlan {
            current_ira_balance: dec!(-1),
            ..base_plan()
        };
        match plan.validate() {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "current_ira_balance"),
            other => panic!("expected invalid balance, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_ranges() {
        let plan = RetirementPlan {
            expected_annual_return: 0.6,
            ..base_plan()
        };
        assert!(plan.validate().is_err());

        let plan = RetirementPlan {
            expected_inflation_rate: f64::NAN,
            ..base_plan()
        };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_contribution_rate_round_trip() {
        let plan = base_plan();
        // 500 * 12 / 75000 = 8%
        assert!((plan.contribution_rate() - 0.08).abs() < 1e-12);
        assert_eq!(plan.contribution_for_rate(0.08), dec!(500));
    }
}
