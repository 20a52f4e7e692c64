//! Bucket balances tracked while a plan accumulates

use crate::money::to_f64;
use crate::plan::RetirementPlan;

/// Balances and year-to-date flows at a point in the accumulation
#[derive(Debug, Clone)]
pub struct AccumulationState {
    /// Projection year (0 = starting snapshot)
    pub year: u32,

    /// Month within the current year (0-12)
    pub month_in_year: u32,

    pub age: u32,

    /// Tax-deferred bucket (receives 401k contributions and the match)
    pub tax_deferred: f64,

    /// Individual bucket (receives IRA contributions)
    pub individual: f64,

    /// Other savings; growth only
    pub other: f64,

    /// Employee contributions made so far this year
    pub ytd_contributions: f64,

    /// 401k contributions made so far this year, basis for the match
    pub ytd_401k: f64,

    /// Employer match credited at the close of the current year
    pub ytd_match: f64,

    monthly_401k: f64,
    monthly_ira: f64,
}

impl AccumulationState {
    /// Initial state from a plan's starting balances
    pub fn from_plan(plan: &RetirementPlan) -> Self {
        Self {
            year: 0,
            month_in_year: 0,
            age: plan.current_age,
            tax_deferred: to_f64(plan.current_401k_balance),
            individual: to_f64(plan.current_ira_balance),
            other: to_f64(plan.other_retirement_savings),
            ytd_contributions: 0.0,
            ytd_401k: 0.0,
            ytd_match: 0.0,
            monthly_401k: to_f64(plan.monthly_401k_contribution),
            monthly_ira: to_f64(plan.monthly_ira_contribution),
        }
    }

    /// Start a new projection year
    pub fn begin_year(&mut self) {
        self.year += 1;
        self.age += 1;
        self.month_in_year = 0;
        self.ytd_contributions = 0.0;
        self.ytd_401k = 0.0;
        self.ytd_match = 0.0;
    }

    /// Grow every bucket one month, then add that month's contributions
    pub fn advance_month(&mut self, monthly_rate: f64) {
        self.month_in_year += 1;

        let growth = 1.0 + monthly_rate;
        self.tax_deferred = self.tax_deferred * growth + self.monthly_401k;
        self.individual = self.individual * growth + self.monthly_ira;
        self.other *= growth;

        self.ytd_401k += self.monthly_401k;
        self.ytd_contributions += self.monthly_401k + self.monthly_ira;
    }

    /// Credit the employer match for the year to the tax-deferred bucket
    pub fn credit_match(&mut self, amount: f64) {
        self.ytd_match = amount;
        self.tax_deferred += amount;
    }

    pub fn total(&self) -> f64 {
        self.tax_deferred + self.individual + self.other
    }
}
