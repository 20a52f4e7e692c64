//! What-if comparison of named overrides against a base plan

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::money::{percent_change, round_rate, to_f64};
use crate::plan::{NamedScenario, RetirementPlan};
use crate::projection::{ProjectionResult, Readiness, RetirementProjector};

/// One scenario's projection and its deltas against the base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub description: Option<String>,
    pub final_balance: Decimal,
    pub monthly_income: Decimal,
    pub required_monthly_income: Decimal,
    pub readiness: Readiness,
    pub balance_difference: Decimal,
    pub balance_percent_change: f64,
    pub income_difference: Decimal,
    pub income_percent_change: f64,
}

/// Best and worst scenarios by final balance
///
/// The base plan is the starting point, so `best_scenario` stays `None`
/// when nothing beats it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfSummary {
    pub best_scenario: Option<String>,
    pub worst_scenario: Option<String>,
    pub best_balance: Decimal,
    pub worst_balance: Decimal,
    pub balance_range: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfReport {
    pub base: ProjectionResult,
    pub scenarios: Vec<ScenarioOutcome>,
    pub summary: WhatIfSummary,
}

/// Project the base plan and every scenario, in input order
///
/// Any scenario that produces an invalid plan fails the whole report.
pub fn what_if(
    projector: &RetirementProjector,
    plan: &RetirementPlan,
    scenarios: &[NamedScenario],
) -> EngineResult<WhatIfReport> {
    let base = projector.project(plan)?;
    debug!("what-if: {} scenarios against base", scenarios.len());

    let outcomes = scenarios
        .iter()
        .map(|scenario| {
            let patched = scenario.overrides.apply(plan)?;
            let result = projector.project(&patched)?;
            Ok(compare(&base, scenario, &result))
        })
        .collect::<EngineResult<Vec<_>>>()?;

    let summary = summarize(&base, &outcomes);
    Ok(WhatIfReport {
        base,
        scenarios: outcomes,
        summary,
    })
}

fn compare(base: &ProjectionResult, scenario: &NamedScenario, result: &ProjectionResult) -> ScenarioOutcome {
    let base_balance = base.projected_retirement_balance;
    let base_income = base.monthly_retirement_income;

    ScenarioOutcome {
        name: scenario.name.clone(),
        description: scenario.description.clone(),
        final_balance: result.projected_retirement_balance,
        monthly_income: result.monthly_retirement_income,
        required_monthly_income: result.required_monthly_income,
        readiness: result.readiness,
        balance_difference: result.projected_retirement_balance - base_balance,
        balance_percent_change: round_rate(percent_change(
            to_f64(base_balance),
            to_f64(result.projected_retirement_balance),
        )),
        income_difference: result.monthly_retirement_income - base_income,
        income_percent_change: round_rate(percent_change(
            to_f64(base_income),
            to_f64(result.monthly_retirement_income),
        )),
    }
}

fn summarize(base: &ProjectionResult, outcomes: &[ScenarioOutcome]) -> WhatIfSummary {
    let mut best_scenario = None;
    let mut worst_scenario = None;
    let mut best_balance = base.projected_retirement_balance;
    let mut worst_balance = base.projected_retirement_balance;

    for outcome in outcomes {
        if outcome.final_balance > best_balance {
            best_balance = outcome.final_balance;
            best_scenario = Some(outcome.name.clone());
        }
        if outcome.final_balance < worst_balance {
            worst_balance = outcome.final_balance;
            worst_scenario = Some(outcome.name.clone());
        }
    }

    WhatIfSummary {
        best_scenario,
        worst_scenario,
        best_balance,
        worst_balance,
        balance_range: best_balance - worst_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::plan::ScenarioOverride;
    use rust_decimal_macros::dec;

    fn plan() -> RetirementPlan {
        RetirementPlan {
            current_401k_balance: dec!(40000),
            monthly_401k_contribution: dec!(600),
            ..RetirementPlan::new(35, 65, dec!(90000))
        }
    }

    #[test]
    fn test_scenarios_report_deltas_against_base() {
        let scenarios = vec![
            NamedScenario::new("higher return", ScenarioOverride::default().with_return(0.09)),
            NamedScenario::new("retire early", ScenarioOverride::default().with_retirement_age(60)),
        ];
        let report = what_if(&RetirementProjector::default(), &plan(), &scenarios).unwrap();

        assert_eq!(report.scenarios.len(), 2);
        let better = &report.scenarios[0];
        assert!(better.balance_difference > Decimal::ZERO);
        assert!(better.balance_percent_change > 0.0);
        assert_eq!(
            better.final_balance - report.base.projected_retirement_balance,
            better.balance_difference
        );

        let early = &report.scenarios[1];
        assert!(early.balance_difference < Decimal::ZERO);

        assert_eq!(report.summary.best_scenario.as_deref(), Some("higher return"));
        assert_eq!(report.summary.worst_scenario.as_deref(), Some("retire early"));
        assert_eq!(
            report.summary.balance_range,
            better.final_balance - early.final_balance
        );
    }

    #[test]
    fn test_empty_override_matches_base() {
        let scenarios = vec![NamedScenario::new("same", ScenarioOverride::default())];
        let report = what_if(&RetirementProjector::default(), &plan(), &scenarios).unwrap();
        assert_eq!(report.scenarios[0].balance_difference, Decimal::ZERO);
        assert_eq!(report.scenarios[0].balance_percent_change, 0.0);
        assert_eq!(report.summary.best_scenario, None);
        assert_eq!(report.summary.balance_range, Decimal::ZERO);
    }

    #[test]
    fn test_invalid_scenario_fails_whole_report() {
        let scenarios = vec![
            NamedScenario::new("fine", ScenarioOverride::default().with_inflation(0.02)),
            NamedScenario::new("broken", ScenarioOverride::default().with_retirement_age(30)),
        ];
        let result = what_if(&RetirementProjector::default(), &plan(), &scenarios);
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }
}
