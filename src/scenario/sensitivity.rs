//! One-at-a-time sensitivity of the retirement balance

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::money::{percent_change, round_rate, to_f64};
use crate::plan::{RetirementPlan, ScenarioOverride};
use crate::projection::RetirementProjector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensitivityVariable {
    ReturnRate,
    ContributionRate,
    InflationRate,
}

impl SensitivityVariable {
    /// Fixed evaluation order; earlier variables win score ties
    pub const ALL: [SensitivityVariable; 3] = [
        SensitivityVariable::ReturnRate,
        SensitivityVariable::ContributionRate,
        SensitivityVariable::InflationRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityVariable::ReturnRate => "returnRate",
            SensitivityVariable::ContributionRate => "contributionRate",
            SensitivityVariable::InflationRate => "inflationRate",
        }
    }

    fn base_value(&self, plan: &RetirementPlan) -> f64 {
        match self {
            SensitivityVariable::ReturnRate => plan.expected_annual_return,
            SensitivityVariable::ContributionRate => plan.contribution_rate(),
            SensitivityVariable::InflationRate => plan.expected_inflation_rate,
        }
    }

    /// Valid range for the variable's value
    fn domain(&self) -> (f64, f64) {
        match self {
            SensitivityVariable::ReturnRate => (0.0, 0.5),
            SensitivityVariable::ContributionRate => (0.0, 1.0),
            SensitivityVariable::InflationRate => (0.0, 0.2),
        }
    }

    fn patch(&self, value: f64) -> ScenarioOverride {
        let patch = ScenarioOverride::default();
        match self {
            SensitivityVariable::ReturnRate => patch.with_return(value),
            SensitivityVariable::ContributionRate => patch.with_contribution_rate(value),
            SensitivityVariable::InflationRate => patch.with_inflation(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    pub return_step: f64,
    /// Step in share of income
    pub contribution_step: f64,
    pub inflation_step: f64,
    /// Steps tested on each side of the base value
    pub levels: u32,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            return_step: 0.01,
            contribution_step: 0.01,
            inflation_step: 0.005,
            levels: 3,
        }
    }
}

impl SensitivityConfig {
    pub fn step(&self, variable: SensitivityVariable) -> f64 {
        match variable {
            SensitivityVariable::ReturnRate => self.return_step,
            SensitivityVariable::ContributionRate => self.contribution_step,
            SensitivityVariable::InflationRate => self.inflation_step,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        for (field, step) in [
            ("return_step", self.return_step),
            ("contribution_step", self.contribution_step),
            ("inflation_step", self.inflation_step),
        ] {
            if !(step.is_finite() && step > 0.0) {
                return Err(EngineError::invalid(field, format!("{} is not a positive step", step)));
            }
        }
        if self.levels == 0 || self.levels > 10 {
            return Err(EngineError::invalid(
                "levels",
                format!("{} is outside 1-10", self.levels),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityLevel {
    /// Signed number of steps from the base value
    pub level: i32,
    pub value: f64,
    pub final_balance: Decimal,
    pub monthly_income: Decimal,
    pub required_monthly_income: Decimal,
    /// Percent change of the final balance against the base
    pub percent_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSensitivity {
    pub variable: SensitivityVariable,
    pub base_value: f64,
    pub step: f64,
    pub levels: Vec<SensitivityLevel>,
    /// Largest |percent change| per percentage point moved
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub base_final_balance: Decimal,
    pub base_monthly_income: Decimal,
    pub variables: Vec<VariableSensitivity>,
    pub most_sensitive_variable: Option<SensitivityVariable>,
}

pub fn sensitivity(
    projector: &RetirementProjector,
    config: &SensitivityConfig,
    plan: &RetirementPlan,
) -> EngineResult<SensitivityReport> {
    config.validate()?;
    let base = projector.project(plan)?;
    let base_balance = to_f64(base.projected_retirement_balance);

    let mut variables = Vec::with_capacity(SensitivityVariable::ALL.len());
    for variable in SensitivityVariable::ALL {
        let base_value = variable.base_value(plan);
        let step = config.step(variable);
        let (min, max) = variable.domain();
        let mut levels = Vec::new();
        let mut score = 0.0_f64;

        let span = config.levels as i32;
        for level in (-span..=span).filter(|&l| l != 0) {
            let value = base_value + f64::from(level) * step;
            if value < min || value > max {
                warn!(
                    "{} level {:+} ({:.4}) is outside [{}, {}], skipped",
                    variable.as_str(),
                    level,
                    value,
                    min,
                    max
                );
                continue;
            }

            let patched = variable.patch(value).apply(plan)?;
            let result = projector.project(&patched)?;
            let change = percent_change(base_balance, to_f64(result.projected_retirement_balance));
            let moved_points = (f64::from(level) * step * 100.0).abs();
            score = score.max(change.abs() / moved_points);

            levels.push(SensitivityLevel {
                level,
                value: round_rate(value),
                final_balance: result.projected_retirement_balance,
                monthly_income: result.monthly_retirement_income,
                required_monthly_income: result.required_monthly_income,
                percent_change: round_rate(change),
            });
        }

        debug!("{} sensitivity score {:.4}", variable.as_str(), score);
        variables.push(VariableSensitivity {
            variable,
            base_value: round_rate(base_value),
            step,
            levels,
            score: round_rate(score),
        });
    }

    let mut most_sensitive: Option<&VariableSensitivity> = None;
    for candidate in variables.iter().filter(|v| !v.levels.is_empty()) {
        match most_sensitive {
            Some(best) if candidate.score <= best.score => {}
            _ => most_sensitive = Some(candidate),
        }
    }
    let most_sensitive_variable = most_sensitive.map(|v| v.variable);

    Ok(SensitivityReport {
        base_final_balance: base.projected_retirement_balance,
        base_monthly_income: base.monthly_retirement_income,
        variables,
        most_sensitive_variable,
    })
}
