//! Output records for retirement projections

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Readiness classification of projected vs. required income
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Readiness {
    OnTrack,
    NeedsImprovement,
    Behind,
}

impl Readiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Readiness::OnTrack => "ON_TRACK",
            Readiness::NeedsImprovement => "NEEDS_IMPROVEMENT",
            Readiness::Behind => "BEHIND",
        }
    }
}

/// End-of-year snapshot (year 0 is the starting position)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjection {
    pub year: u32,
    pub age: u32,
    pub tax_deferred_balance: Decimal,
    pub individual_balance: Decimal,
    pub other_balance: Decimal,
    pub total_balance: Decimal,
    /// Employee contributions made during this year
    pub employee_contributions: Decimal,
    /// Employer match credited at the end of this year
    pub employer_match: Decimal,
}

/// Where the projected balance comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementBreakdown {
    pub tax_deferred_balance: Decimal,
    pub individual_balance: Decimal,
    pub other_balance: Decimal,
    pub total_employee_contributions: Decimal,
    pub total_employer_match: Decimal,
    /// Final balance less starting balances and all contributions
    pub investment_growth: Decimal,
    pub monthly_social_security: Decimal,
    /// Annual retirement income expressed in today's dollars
    pub inflation_adjusted_annual_income: Decimal,
}

/// Complete projection result for one plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub plan_id: Option<u64>,
    pub years_to_retirement: u32,
    pub projected_retirement_balance: Decimal,
    pub monthly_retirement_income: Decimal,
    pub required_monthly_income: Decimal,
    /// Retirement income over current monthly income
    pub replacement_ratio: f64,
    pub withdrawal_rate: f64,
    pub readiness: Readiness,
    pub income_shortfall: Decimal,
    /// Extra monthly saving that would close the shortfall
    pub recommended_monthly_savings: Option<Decimal>,
    pub yearly_projections: Vec<YearlyProjection>,
    pub breakdown: RetirementBreakdown,
}

impl ProjectionResult {
    pub fn final_age(&self) -> Option<u32> {
        self.yearly_projections.last().map(|y| y.age)
    }

    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary {
            plan_id: self.plan_id,
            years_to_retirement: self.years_to_retirement,
            retirement_age: self.final_age().unwrap_or(0),
            projected_retirement_balance: self.projected_retirement_balance,
            monthly_retirement_income: self.monthly_retirement_income,
            required_monthly_income: self.required_monthly_income,
            replacement_ratio: self.replacement_ratio,
            readiness: self.readiness,
            income_shortfall: self.income_shortfall,
        }
    }
}

/// One flat row per plan, suitable for CSV output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub plan_id: Option<u64>,
    pub years_to_retirement: u32,
    pub retirement_age: u32,
    pub projected_retirement_balance: Decimal,
    pub monthly_retirement_income: Decimal,
    pub required_monthly_income: Decimal,
    pub replacement_ratio: f64,
    pub readiness: Readiness,
    pub income_shortfall: Decimal,
}
