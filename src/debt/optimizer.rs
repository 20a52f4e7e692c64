//! Debt payoff optimizer: strategy plans, comparison and consolidation

use log::{debug, warn};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::amortization::{Amortization, PaymentMode, Simulation, Simulator};
use super::results::{
    BaselineComparison, ConsolidationAnalysis, ConsolidationOffer, DebtPayoff, PayoffPlan,
    StrategyComparison,
};
use super::strategy::Strategy;
use crate::error::{EngineError, EngineResult};
use crate::money::{amortizing_payment, round_currency};
use crate::plan::Debt;

/// Configuration for debt analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebtConfig {
    /// Amortization loop guard
    pub max_months: u32,

    /// Snowball may cost this much more interest (fraction) and still win
    pub snowball_tolerance: f64,

    /// Keep month-by-month schedules in the output
    pub include_schedule: bool,
}

impl Default for DebtConfig {
    fn default() -> Self {
        Self {
            max_months: 1200,
            snowball_tolerance: 0.02,
            include_schedule: true,
        }
    }
}

impl DebtConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_months == 0 {
            return Err(EngineError::invalid("max_months", "must be at least 1"));
        }
        if !(self.snowball_tolerance.is_finite() && self.snowball_tolerance >= 0.0) {
            return Err(EngineError::invalid(
                "snowball_tolerance",
                format!("{} is not a non-negative fraction", self.snowball_tolerance),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DebtOptimizer {
    config: DebtConfig,
}

impl DebtOptimizer {
    pub fn new(config: DebtConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DebtConfig {
        &self.config
    }

    fn simulator(&self) -> Simulator {
        Simulator {
            max_months: self.config.max_months,
            record_schedule: self.config.include_schedule,
        }
    }

    /// Build a payoff plan for `strategy` with `extra_payment` on top of the minimums
    pub fn optimize(
        &self,
        debts: &[Debt],
        extra_payment: Decimal,
        strategy: Strategy,
    ) -> EngineResult<PayoffPlan> {
        let active = active_debts(debts)?;
        if extra_payment < Decimal::ZERO {
            return Err(EngineError::invalid(
                "extra_payment",
                format!("{} is negative", extra_payment),
            ));
        }

        let priority = strategy.order(&active);
        debug!(
            "{} order: {:?}",
            strategy,
            priority.iter().map(|&i| active[i].name.as_str()).collect::<Vec<_>>()
        );

        let simulation = match self
            .simulator()
            .run(&active, &priority, extra_payment, PaymentMode::Rollover)
        {
            Amortization::Converged(sim) => sim,
            Amortization::NonConverging { months } => {
                warn!("{} plan still open after {} months", strategy, months);
                return Err(EngineError::NonConvergence {
                    subject: format!("{} payoff plan", strategy),
                    months,
                });
            }
        };

        let baseline = self.baseline(&active, &priority, &simulation, extra_payment);

        let total_debt: Decimal = active.iter().map(|d| d.current_balance).sum();
        let total_minimum_payments: Decimal = active.iter().map(|d| d.minimum_payment).sum();
        let total_interest = simulation.total_interest();
        let total_paid = simulation.total_paid();
        let total_months = simulation.total_months;

        let mut runs: Vec<Option<_>> = simulation.runs.into_iter().map(Some).collect();
        let debts = priority
            .iter()
            .enumerate()
            .filter_map(|(rank, &i)| {
                let run = runs[i].take()?;
                let debt = active[i];
                Some(DebtPayoff {
                    name: debt.name.clone(),
                    kind: debt.kind,
                    payoff_order: rank + 1,
                    starting_balance: debt.current_balance,
                    interest_rate: debt.interest_rate,
                    minimum_payment: debt.minimum_payment,
                    months_to_payoff: run.months_to_payoff,
                    total_interest: run.total_interest,
                    total_paid: run.total_paid,
                    schedule: run.schedule,
                })
            })
            .collect();

        Ok(PayoffPlan {
            strategy,
            debts,
            total_debt,
            total_minimum_payments,
            extra_payment,
            monthly_payment: total_minimum_payments + extra_payment,
            total_months,
            total_interest,
            total_paid,
            baseline,
        })
    }

    /// Same debts paying only their own minimums, no rollover
    fn baseline(
        &self,
        active: &[&Debt],
        priority: &[usize],
        accelerated: &Simulation,
        extra_payment: Decimal,
    ) -> BaselineComparison {
        let simulator = Simulator {
            record_schedule: false,
            ..self.simulator()
        };

        match simulator.run(active, priority, Decimal::ZERO, PaymentMode::MinimumsOnly) {
            Amortization::Converged(minimums) => {
                let interest_saved = minimums.total_interest() - accelerated.total_interest();
                let months_saved = i64::from(minimums.total_months) - i64::from(accelerated.total_months);
                let recommendation = if interest_saved > dec!(500) {
                    format!(
                        "Highly recommended! Paying ${:.2} extra per month saves ${:.2} in interest and {} months of payments.",
                        extra_payment, interest_saved, months_saved
                    )
                } else if interest_saved > Decimal::ZERO {
                    format!(
                        "Recommended if budget allows. Extra payments save ${:.2} in interest and {} months of payments.",
                        interest_saved, months_saved
                    )
                } else {
                    "Extra payments save little here; consider building an emergency fund or investing instead.".to_string()
                };

                BaselineComparison {
                    converges: true,
                    months: Some(minimums.total_months),
                    total_interest: Some(minimums.total_interest()),
                    total_paid: Some(minimums.total_paid()),
                    interest_saved: Some(interest_saved),
                    months_saved: Some(months_saved),
                    recommendation,
                }
            }
            Amortization::NonConverging { months } => {
                debug!("minimum-only baseline still open after {} months", months);
                BaselineComparison {
                    converges: false,
                    months: None,
                    total_interest: None,
                    total_paid: None,
                    interest_saved: None,
                    months_saved: None,
                    recommendation: "Minimum payments alone never retire these debts; the rollover plan is required to pay them off.".to_string(),
                }
            }
        }
    }

    /// Run both strategies and pick one
    ///
    /// Avalanche wins unless snowball costs at most `snowball_tolerance` more
    /// interest and also clears its first debt strictly sooner.
    pub fn compare(&self, debts: &[Debt], extra_payment: Decimal) -> EngineResult<StrategyComparison> {
        let avalanche = self.optimize(debts, extra_payment, Strategy::Avalanche)?;
        let snowball = self.optimize(debts, extra_payment, Strategy::Snowball)?;

        let tolerance = Decimal::from_f64(self.config.snowball_tolerance).unwrap_or(Decimal::ZERO);
        let within_tolerance =
            snowball.total_interest <= avalanche.total_interest * (Decimal::ONE + tolerance);
        let quicker_win = snowball.first_payoff_month() < avalanche.first_payoff_month();

        let interest_difference = snowball.total_interest - avalanche.total_interest;
        let months_difference = i64::from(snowball.total_months) - i64::from(avalanche.total_months);

        let (recommended, reason) = if within_tolerance && quicker_win {
            (
                Strategy::Snowball,
                format!(
                    "Snowball costs only ${:.2} more in interest but clears its first debt in month {} instead of month {}, which helps keep momentum.",
                    interest_difference,
                    snowball.first_payoff_month(),
                    avalanche.first_payoff_month()
                ),
            )
        } else if !within_tolerance {
            (
                Strategy::Avalanche,
                format!(
                    "Avalanche saves ${:.2} in interest over snowball by paying the highest rates first.",
                    interest_difference
                ),
            )
        } else {
            (
                Strategy::Avalanche,
                "Avalanche minimizes total interest and snowball offers no earlier first payoff.".to_string(),
            )
        };

        debug!("recommended {}: {}", recommended, reason);

        Ok(StrategyComparison {
            avalanche,
            snowball,
            recommended,
            reason,
            interest_difference,
            months_difference,
        })
    }

    /// Compare a consolidation loan with keeping the debts (avalanche, no extra)
    pub fn consolidate(
        &self,
        debts: &[Debt],
        offer: &ConsolidationOffer,
    ) -> EngineResult<ConsolidationAnalysis> {
        if offer.annual_rate_percent < Decimal::ZERO || offer.annual_rate_percent > dec!(100) {
            return Err(EngineError::invalid(
                "annual_rate_percent",
                format!("{}% is outside [0, 100]", offer.annual_rate_percent),
            ));
        }
        if offer.term_months == Some(0) {
            return Err(EngineError::invalid("term_months", "must be at least 1"));
        }

        let current = self.optimize(debts, Decimal::ZERO, Strategy::Avalanche)?;
        let active = active_debts(debts)?;

        let total_balance = current.total_debt;
        let current_payment = current.total_minimum_payments;
        let consolidated_payment = match offer.term_months {
            Some(term) => amortizing_payment(total_balance, offer.annual_rate_percent, term),
            None => current_payment,
        };

        let loan = Debt::new(
            "Consolidated loan",
            total_balance,
            offer.annual_rate_percent,
            consolidated_payment,
        );
        let simulator = Simulator {
            record_schedule: false,
            ..self.simulator()
        };
        let consolidated = match simulator.run(&[&loan], &[0], Decimal::ZERO, PaymentMode::Rollover) {
            Amortization::Converged(sim) => sim,
            Amortization::NonConverging { months } => {
                warn!(
                    "consolidated loan at {}% with payment {} does not amortize",
                    offer.annual_rate_percent, consolidated_payment
                );
                return Err(EngineError::NonConvergence {
                    subject: "consolidated loan".to_string(),
                    months,
                });
            }
        };

        let weighted_rate = if total_balance > Decimal::ZERO {
            active
                .iter()
                .map(|d| d.current_balance * d.interest_rate)
                .sum::<Decimal>()
                / total_balance
        } else {
            Decimal::ZERO
        };

        let consolidated_interest = consolidated.total_interest();
        let interest_savings = current.total_interest - consolidated_interest;
        let time_savings = i64::from(current.total_months) - i64::from(consolidated.total_months);
        let beneficial = interest_savings > Decimal::ZERO && consolidated_payment <= current_payment;

        let mut benefits = Vec::new();
        let mut considerations = Vec::new();
        let recommendation = if beneficial {
            benefits.push("Lower overall interest rate".to_string());
            benefits.push(format!(
                "Simplified payment management (one payment instead of {})",
                active.len()
            ));
            benefits.push(format!("Save ${:.2} in total interest", interest_savings));
            if time_savings > 0 {
                benefits.push(format!("Pay off debt {} months earlier", time_savings));
            }
            format!(
                "Debt consolidation is recommended. You could save ${:.2} in interest over the life of your loans.",
                interest_savings
            )
        } else {
            considerations.push("Consolidation rate is not significantly lower than current average rate".to_string());
            considerations.push("May not provide substantial interest savings".to_string());
            if consolidated_payment > current_payment {
                considerations.push(format!(
                    "Monthly payment rises by ${:.2}",
                    consolidated_payment - current_payment
                ));
            }
            "Debt consolidation may not be beneficial at this rate. Consider negotiating a lower rate or other debt reduction strategies.".to_string()
        };
        considerations.push("Ensure you qualify for the consolidation loan rate".to_string());
        considerations.push("Consider any fees associated with the consolidation loan".to_string());
        considerations.push("Avoid taking on new debt after consolidation".to_string());
        considerations.push("Consider the impact on your credit score".to_string());

        Ok(ConsolidationAnalysis {
            total_balance,
            current_weighted_rate: round_currency(weighted_rate),
            consolidated_rate: offer.annual_rate_percent,
            current_monthly_payment: current_payment,
            consolidated_monthly_payment: consolidated_payment,
            monthly_savings: current_payment - consolidated_payment,
            current_total_interest: current.total_interest,
            consolidated_total_interest: consolidated_interest,
            interest_savings,
            current_months: current.total_months,
            consolidated_months: consolidated.total_months,
            time_savings_months: time_savings,
            beneficial,
            recommendation,
            benefits,
            considerations,
        })
    }
}

/// Validated open debts, or `NothingToOptimize`
fn active_debts(debts: &[Debt]) -> EngineResult<Vec<&Debt>> {
    for debt in debts {
        debt.validate()?;
    }
    let active: Vec<&Debt> = debts.iter().filter(|d| d.is_open()).collect();
    if active.is_empty() {
        return Err(EngineError::NothingToOptimize);
    }
    Ok(active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::Strategy;
    use crate::plan::DebtStatus;
    use proptest::prelude::*;
    use proptest::strategy::Strategy as _;

    fn three_debts() -> Vec<Debt> {
        vec![
            Debt::new("Student loan", dec!(25000), dec!(6), dec!(280)),
            Debt::new("Credit card", dec!(5000), dec!(18), dec!(150)),
            Debt::new("Car loan", dec!(15000), dec!(12), dec!(335)),
        ]
    }

    #[test]
    fn test_avalanche_pays_highest_rate_first() {
        let plan = DebtOptimizer::default()
            .optimize(&three_debts(), dec!(200), Strategy::Avalanche)
            .unwrap();

        let rates: Vec<Decimal> = plan.debts.iter().map(|d| d.interest_rate).collect();
        assert_eq!(rates, vec![dec!(18), dec!(12), dec!(6)]);
        assert_eq!(plan.debts[0].payoff_order, 1);
        assert_eq!(plan.total_debt, dec!(45000));
        assert_eq!(plan.monthly_payment, dec!(965));
        assert_eq!(plan.total_paid, plan.total_debt + plan.total_interest);
    }

    #[test]
    fn test_avalanche_never_worse_than_minimums() {
        let plan = DebtOptimizer::default()
            .optimize(&three_debts(), dec!(200), Strategy::Avalanche)
            .unwrap();
        let baseline = &plan.baseline;
        assert!(baseline.converges);
        assert!(plan.total_interest <= baseline.total_interest.unwrap());
        assert!(baseline.interest_saved.unwrap() > dec!(500));
        assert!(baseline.recommendation.starts_with("Highly recommended"));
    }

    #[test]
    fn test_paid_off_debts_are_ignored() {
        let mut debts = three_debts();
        debts[1].status = DebtStatus::PaidOff;
        let plan = DebtOptimizer::default()
            .optimize(&debts, dec!(0), Strategy::Avalanche)
            .unwrap();
        assert_eq!(plan.debts.len(), 2);
        assert_eq!(plan.total_debt, dec!(40000));
    }

    #[test]
    fn test_nothing_to_optimize() {
        let mut debts = three_debts();
        for d in debts.iter_mut() {
            d.status = DebtStatus::PaidOff;
        }
        assert_eq!(
            DebtOptimizer::default().optimize(&debts, dec!(0), Strategy::Snowball),
            Err(EngineError::NothingToOptimize)
        );
        assert_eq!(
            DebtOptimizer::default().compare(&[], dec!(100)).unwrap_err(),
            EngineError::NothingToOptimize
        );
    }

    #[test]
    fn test_non_amortizing_plan_is_an_error() {
        let debts = vec![Debt::new("Card", dec!(20000), dec!(24), dec!(100))];
        let result = DebtOptimizer::default().optimize(&debts, dec!(50), Strategy::Avalanche);
        assert!(matches!(result, Err(EngineError::NonConvergence { months: 1200, .. })));
    }

    #[test]
    fn test_baseline_that_never_ends_is_reported() {
        // 100/month cannot cover 400 of interest, but 500 extra can
        let debts = vec![Debt::new("Card", dec!(20000), dec!(24), dec!(100))];
        let plan = DebtOptimizer::default()
            .optimize(&debts, dec!(500), Strategy::Avalanche)
            .unwrap();
        assert!(!plan.baseline.converges);
        assert_eq!(plan.baseline.interest_saved, None);
    }

    #[test]
    fn test_compare_prefers_avalanche_when_cheaper() {
        let comparison = DebtOptimizer::default().compare(&three_debts(), dec!(200)).unwrap();
        assert!(comparison.avalanche.total_interest <= comparison.snowball.total_interest);
        assert!(!comparison.reason.is_empty());
        assert_eq!(
            comparison.recommended_plan().strategy,
            comparison.recommended
        );
    }

    #[test]
    fn test_compare_prefers_snowball_for_small_quick_win() {
        // A tiny low-rate balance next to a large one with a barely higher rate
        let debts = vec![
            Debt::new("Big", dec!(20000), dec!(10), dec!(400)),
            Debt::new("Tiny", dec!(300), dec!(9.9), dec!(25)),
        ];
        let comparison = DebtOptimizer::default().compare(&debts, dec!(300)).unwrap();
        assert_eq!(comparison.recommended, Strategy::Snowball);
        assert!(comparison.snowball.first_payoff_month() < comparison.avalanche.first_payoff_month());
    }

    #[test]
    fn test_consolidation_at_lower_rate_is_beneficial() {
        let offer = ConsolidationOffer {
            annual_rate_percent: dec!(5),
            term_months: None,
        };
        let analysis = DebtOptimizer::default().consolidate(&three_debts(), &offer).unwrap();

        assert!(analysis.beneficial);
        assert!(analysis.interest_savings > Decimal::ZERO);
        assert_eq!(analysis.monthly_savings, Decimal::ZERO);
        assert_eq!(analysis.consolidated_monthly_payment, dec!(765));
        assert!(analysis.benefits.iter().any(|b| b.contains("one payment instead of 3")));
        assert!(analysis.considerations.len() >= 4);
    }

    #[test]
    fn test_consolidation_at_higher_rate_is_not_beneficial() {
        let offer = ConsolidationOffer {
            annual_rate_percent: dec!(19),
            term_months: None,
        };
        let analysis = DebtOptimizer::default().consolidate(&three_debts(), &offer).unwrap();
        assert!(!analysis.beneficial);
        assert!(analysis.benefits.is_empty());
    }

    #[test]
    fn test_consolidation_with_short_term_raises_payment() {
        let offer = ConsolidationOffer {
            annual_rate_percent: dec!(5),
            term_months: Some(24),
        };
        let analysis = DebtOptimizer::default().consolidate(&three_debts(), &offer).unwrap();
        // Higher payment than the minimums, so not beneficial even though it is cheaper
        assert!(analysis.consolidated_monthly_payment > analysis.current_monthly_payment);
        assert!(analysis.interest_savings > Decimal::ZERO);
        assert!(!analysis.beneficial);
        assert!(analysis.consolidated_months <= 25);
    }

    #[test]
    fn test_consolidated_loan_that_never_ends() {
        let debts = vec![
            Debt::new("A", dec!(10000), dec!(5), dec!(50)),
            Debt::new("B", dec!(10000), dec!(5), dec!(50)),
        ];
        let offer = ConsolidationOffer {
            annual_rate_percent: dec!(30),
            term_months: None,
        };
        let result = DebtOptimizer::default().consolidate(&debts, &offer);
        assert!(matches!(result, Err(EngineError::NonConvergence { .. })));
    }

    #[test]
    fn test_runaway_baseline_with_affordable_plan() {
        // The minimum alone compounds out of range; 2,000 extra clears it
        let debts = vec![Debt::new("Payday", dec!(10000), dec!(80), dec!(100))];
        let plan = DebtOptimizer::default()
            .optimize(&debts, dec!(2000), Strategy::Avalanche)
            .unwrap();
        assert!(!plan.baseline.converges);
        assert_eq!(plan.baseline.total_interest, None);
        assert!(plan.total_months < 12);
    }

    #[test]
    fn test_runaway_plan_is_an_error() {
        let debts = vec![Debt::new("Payday", dec!(10000), dec!(99), dec!(100))];
        let result = DebtOptimizer::default().optimize(&debts, dec!(0), Strategy::Avalanche);
        assert!(matches!(result, Err(EngineError::NonConvergence { months: 1200, .. })));
        assert!(matches!(
            DebtOptimizer::default().compare(&debts, dec!(0)),
            Err(EngineError::NonConvergence { .. })
        ));
    }

    /// One to five debts: balance in dollars, APR in hundredths of a percent
    /// up to 100%, minimum payment in dollars
    fn debt_set() -> impl proptest::strategy::Strategy<Value = Vec<Debt>> {
        prop::collection::vec((1u32..50_000, 0u32..=10_000, 1u32..2_000), 1..=5).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (balance, apr, minimum))| {
                    Debt::new(
                        format!("Debt {}", i + 1),
                        Decimal::from(balance),
                        Decimal::new(i64::from(apr), 2),
                        Decimal::from(minimum),
                    )
                })
                .collect()
        })
    }

    fn strategies() -> impl proptest::strategy::Strategy<Value = Strategy> {
        prop_oneof![Just(Strategy::Avalanche), Just(Strategy::Snowball)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_generated_plan_never_worse_than_minimums(
            debts in debt_set(),
            extra in 0u32..2_000,
            strategy in strategies(),
        ) {
            let optimizer = DebtOptimizer::new(DebtConfig {
                include_schedule: false,
                ..DebtConfig::default()
            });
            match optimizer.optimize(&debts, Decimal::from(extra), strategy) {
                Ok(plan) => {
                    if plan.baseline.converges {
                        let baseline = plan.baseline.total_interest.unwrap();
                        prop_assert!(plan.total_interest <= baseline);
                        prop_assert!(plan.total_months <= plan.baseline.months.unwrap());
                    }
                }
                Err(e) => prop_assert!(matches!(e, EngineError::NonConvergence { .. }), "{}", e),
            }
        }

        #[test]
        fn prop_generated_extra_never_costs_more(
            debts in debt_set(),
            extra in 0u32..2_000,
            bump in 0u32..2_000,
            strategy in strategies(),
        ) {
            let optimizer = DebtOptimizer::new(DebtConfig {
                include_schedule: false,
                ..DebtConfig::default()
            });
            let low = optimizer.optimize(&debts, Decimal::from(extra), strategy);
            let high = optimizer.optimize(&debts, Decimal::from(extra + bump), strategy);
            match (low, high) {
                (Ok(low), Ok(high)) => {
                    prop_assert!(high.total_interest <= low.total_interest);
                    prop_assert!(high.total_months <= low.total_months);
                }
                // More money cannot turn a finishing plan into a runaway one
                (Ok(_), Err(e)) => prop_assert!(false, "more extra failed: {}", e),
                (Err(e), _) => prop_assert!(matches!(e, EngineError::NonConvergence { .. }), "{}", e),
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_more_extra_never_costs_more(
            extra in 0u32..500,
            bump in 0u32..500,
            strategy in prop_oneof![Just(Strategy::Avalanche), Just(Strategy::Snowball)],
        ) {
            let optimizer = DebtOptimizer::new(DebtConfig {
                include_schedule: false,
                ..DebtConfig::default()
            });
            let low = optimizer.optimize(&three_debts(), Decimal::from(extra), strategy).unwrap();
            let high = optimizer
                .optimize(&three_debts(), Decimal::from(extra + bump), strategy)
                .unwrap();
            prop_assert!(high.total_interest <= low.total_interest);
            prop_assert!(high.total_months <= low.total_months);
        }
    }
}
