//! Sparse overrides applied on top of a base plan

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::data::{check_range, RetirementPlan};
use crate::error::EngineResult;

/// A partial set of plan fields; unset fields keep the base value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioOverride {
    pub expected_return: Option<f64>,

    /// Share of income sent to the tax-deferred bucket each month
    pub contribution_rate: Option<f64>,

    pub retirement_age: Option<u32>,

    pub inflation_rate: Option<f64>,

    /// Explicit monthly 401k amount; takes precedence over `contribution_rate`
    pub monthly_401k_contribution: Option<Decimal>,

    pub monthly_ira_contribution: Option<Decimal>,
}

impl ScenarioOverride {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_return(mut self, rate: f64) -> Self {
        self.expected_return = Some(rate);
        self
    }

    pub fn with_contribution_rate(mut self, rate: f64) -> Self {
        self.contribution_rate = Some(rate);
        self
    }

    pub fn with_retirement_age(mut self, age: u32) -> Self {
        self.retirement_age = Some(age);
        self
    }

    pub fn with_inflation(mut self, rate: f64) -> Self {
        self.inflation_rate = Some(rate);
        self
    }

    /// Merge onto `base`, returning a new validated plan
    ///
    /// `base` is left untouched.
    pub fn apply(&self, base: &RetirementPlan) -> EngineResult<RetirementPlan> {
        let mut plan = base.clone();

        if let Some(rate) = self.expected_return {
            plan.expected_annual_return = rate;
        }
        if let Some(rate) = self.inflation_rate {
            plan.expected_inflation_rate = rate;
        }
        if let Some(age) = self.retirement_age {
            plan.retirement_age = age;
        }
        if let Some(rate) = self.contribution_rate {
            check_range("contribution_rate", rate, 0.0, 1.0)?;
            plan.monthly_401k_contribution = plan.contribution_for_rate(rate);
        }
        if let Some(amount) = self.monthly_401k_contribution {
            plan.monthly_401k_contribution = amount;
        }
        if let Some(amount) = self.monthly_ira_contribution {
            plan.monthly_ira_contribution = amount;
        }

        plan.validate()?;
        Ok(plan)
    }
}

/// A labelled override, as used by what-if runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedScenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub overrides: ScenarioOverride,
}

impl NamedScenario {
    pub fn new(name: impl Into<String>, overrides: ScenarioOverride) -> Self {
        Self {
            name: name.into(),
            description: None,
            overrides,
        }
    }
}
