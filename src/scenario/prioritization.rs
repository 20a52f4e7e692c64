//! Goal prioritization by urgency, impact, feasibility and cost

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::money::{round_rate, to_f64, to_money};
use crate::plan::{Goal, GoalCategory};

/// Weights of the four axes in the total score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub urgency: f64,
    pub impact: f64,
    pub feasibility: f64,
    pub cost: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            urgency: 0.30,
            impact: 0.30,
            feasibility: 0.25,
            cost: 0.15,
        }
    }
}

impl PriorityWeights {
    pub fn validate(&self) -> EngineResult<()> {
        let weights = [self.urgency, self.impact, self.feasibility, self.cost];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(EngineError::invalid("priority_weights", "weights must be non-negative"));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(EngineError::invalid("priority_weights", "weights sum to zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLevel {
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            PriorityLevel::High
        } else if score >= 60.0 {
            PriorityLevel::Medium
        } else {
            PriorityLevel::Low
        }
    }
}

/// Shorter timelines score higher
pub fn urgency_score(timeline_months: u32) -> f64 {
    match timeline_months {
        0..=12 => 100.0,
        13..=24 => 80.0,
        25..=36 => 60.0,
        37..=60 => 40.0,
        _ => 20.0,
    }
}

/// Category weight, nudged by the size of the goal
pub fn impact_score(category: GoalCategory, target_amount: Decimal) -> f64 {
    let base: f64 = match category {
        GoalCategory::EmergencyFund => 100.0,
        GoalCategory::DebtPayoff => 95.0,
        GoalCategory::Retirement => 90.0,
        GoalCategory::HomePurchase => 75.0,
        GoalCategory::Education => 70.0,
        GoalCategory::Other => 50.0,
        GoalCategory::Vacation => 30.0,
    };
    let amount = to_f64(target_amount);
    let adjusted = if amount > 100_000.0 {
        base + 10.0
    } else if amount < 10_000.0 {
        base - 10.0
    } else {
        base
    };
    adjusted.clamp(0.0, 100.0)
}

/// Capacity relative to the monthly funding the timeline needs
pub fn feasibility_score(goal: &Goal) -> f64 {
    if goal.target_amount <= Decimal::ZERO {
        return 100.0;
    }
    let capacity = to_f64(goal.monthly_capacity);
    if capacity <= 0.0 {
        return 0.0;
    }
    let ratio = capacity / goal.required_monthly();
    if ratio >= 1.5 {
        100.0
    } else if ratio >= 1.2 {
        80.0
    } else if ratio >= 1.0 {
        60.0
    } else if ratio >= 0.8 {
        40.0
    } else {
        20.0
    }
}

/// Months of full capacity the target would consume
pub fn cost_score(goal: &Goal) -> f64 {
    if goal.target_amount <= Decimal::ZERO {
        return 100.0;
    }
    let capacity = to_f64(goal.monthly_capacity);
    if capacity <= 0.0 {
        return 0.0;
    }
    let months = to_f64(goal.target_amount) / capacity;
    if months <= 6.0 {
        100.0
    } else if months <= 24.0 {
        80.0
    } else if months <= 60.0 {
        60.0
    } else if months <= 120.0 {
        40.0
    } else {
        20.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredGoal {
    /// 1-based position after ranking
    pub rank: usize,
    pub name: String,
    pub category: GoalCategory,
    pub target_amount: Decimal,
    pub timeline_months: u32,
    pub monthly_capacity: Decimal,
    pub required_monthly: Decimal,
    pub urgency_score: f64,
    pub impact_score: f64,
    pub feasibility_score: f64,
    pub cost_score: f64,
    pub total_score: f64,
    pub priority: PriorityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOffAnalysis {
    pub total_funding_needed: Decimal,
    pub total_monthly_requirement: Decimal,
    pub total_monthly_capacity: Decimal,
    /// Requirement not covered by capacity
    pub monthly_gap: Decimal,
    /// Goals that push the cumulative requirement past capacity, in rank order
    pub potential_conflicts: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritizationReport {
    pub goals: Vec<ScoredGoal>,
    pub recommendations: Vec<String>,
    pub trade_offs: TradeOffAnalysis,
}

/// Score, rank and cross-check a set of goals
///
/// `capacity_override` replaces the summed per-goal capacities as the
/// household's total monthly capacity.
pub fn prioritize(
    weights: &PriorityWeights,
    goals: &[Goal],
    capacity_override: Option<Decimal>,
) -> EngineResult<PrioritizationReport> {
    weights.validate()?;
    for goal in goals {
        goal.validate()?;
    }
    if let Some(capacity) = capacity_override {
        if capacity < Decimal::ZERO {
            return Err(EngineError::invalid(
                "monthly_capacity",
                format!("total capacity {} is negative", capacity),
            ));
        }
    }

    let mut scored: Vec<ScoredGoal> = goals.iter().map(|goal| score_goal(weights, goal)).collect();
    // Stable: equal totals keep input order
    scored.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
    for (i, goal) in scored.iter_mut().enumerate() {
        goal.rank = i + 1;
    }
    debug!("prioritized {} goals", scored.len());

    let trade_offs = trade_offs(&scored, goals, capacity_override);
    let recommendations = recommendations(&scored);

    Ok(PrioritizationReport {
        goals: scored,
        recommendations,
        trade_offs,
    })
}

fn score_goal(weights: &PriorityWeights, goal: &Goal) -> ScoredGoal {
    let urgency = urgency_score(goal.timeline_months);
    let impact = impact_score(goal.category, goal.target_amount);
    let feasibility = feasibility_score(goal);
    let cost = cost_score(goal);
    let total = round_rate(
        weights.urgency * urgency
            + weights.impact * impact
            + weights.feasibility * feasibility
            + weights.cost * cost,
    );

    ScoredGoal {
        rank: 0,
        name: goal.name.clone(),
        category: goal.category,
        target_amount: goal.target_amount,
        timeline_months: goal.timeline_months,
        monthly_capacity: goal.monthly_capacity,
        required_monthly: to_money(goal.required_monthly()),
        urgency_score: urgency,
        impact_score: impact,
        feasibility_score: feasibility,
        cost_score: cost,
        total_score: total,
        priority: PriorityLevel::from_score(total),
    }
}

fn trade_offs(
    ranked: &[ScoredGoal],
    goals: &[Goal],
    capacity_override: Option<Decimal>,
) -> TradeOffAnalysis {
    let total_funding_needed: Decimal = goals.iter().map(|g| g.target_amount).sum();
    let total_monthly_requirement: Decimal = ranked.iter().map(|g| g.required_monthly).sum();
    let total_monthly_capacity =
        capacity_override.unwrap_or_else(|| goals.iter().map(|g| g.monthly_capacity).sum());

    let mut cumulative = Decimal::ZERO;
    let mut potential_conflicts = Vec::new();
    for goal in ranked {
        cumulative += goal.required_monthly;
        if cumulative > total_monthly_capacity {
            potential_conflicts.push(goal.name.clone());
        }
    }

    let mut warnings = Vec::new();
    if goals.len() > 5 {
        warnings.push("Too many simultaneous goals may reduce focus and effectiveness".to_string());
    }
    if !goals.iter().any(|g| g.category == GoalCategory::EmergencyFund) {
        warnings.push("No emergency fund goal detected - this should be prioritized first".to_string());
    }

    TradeOffAnalysis {
        total_funding_needed,
        total_monthly_requirement,
        total_monthly_capacity,
        monthly_gap: (total_monthly_requirement - total_monthly_capacity).max(Decimal::ZERO),
        potential_conflicts,
        warnings,
    }
}

fn recommendations(ranked: &[ScoredGoal]) -> Vec<String> {
    let mut out = Vec::new();
    let high = ranked
        .iter()
        .filter(|g| g.priority == PriorityLevel::High)
        .count();
    if high > 3 {
        out.push("You have many high-priority goals. Consider focusing on the top 2-3 to avoid spreading resources too thin.".to_string());
    }
    if let Some(top) = ranked.first() {
        out.push(format!("Direct new savings to '{}' first.", top.name));
    }
    out.push("Start with an emergency fund if one is not already established - it enables all other goals.".to_string());
    out.push("Consider automating savings for your top priority goals to ensure consistent progress.".to_string());
    out.push("Review and adjust goal priorities quarterly as circumstances change.".to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn goals() -> Vec<Goal> {
        vec![
            Goal::new("Trip to Japan", GoalCategory::Vacation, dec!(6000), 12, dec!(400)),
            Goal::new("Rainy day", GoalCategory::EmergencyFund, dec!(15000), 12, dec!(1500)),
            Goal::new("House deposit", GoalCategory::HomePurchase, dec!(60000), 48, dec!(1000)),
        ]
    }

    #[test]
    fn test_axis_tiers() {
        assert_eq!(urgency_score(6), 100.0);
        assert_eq!(urgency_score(24), 80.0);
        assert_eq!(urgency_score(36), 60.0);
        assert_eq!(urgency_score(60), 40.0);
        assert_eq!(urgency_score(61), 20.0);

        assert_eq!(impact_score(GoalCategory::EmergencyFund, dec!(200000)), 100.0);
        assert_eq!(impact_score(GoalCategory::Vacation, dec!(5000)), 20.0);
        assert_eq!(impact_score(GoalCategory::Retirement, dec!(500000)), 100.0);
        assert_eq!(impact_score(GoalCategory::Other, dec!(50000)), 50.0);
    }

    #[test]
    fn test_feasibility_and_cost() {
        // Needs 1000/month, has 1500
        let goal = Goal::new("Fund", GoalCategory::EmergencyFund, dec!(12000), 12, dec!(1500));
        assert_eq!(feasibility_score(&goal), 100.0);
        // 8 months of capacity
        assert_eq!(cost_score(&goal), 80.0);

        let broke = Goal::new("Fund", GoalCategory::EmergencyFund, dec!(12000), 12, dec!(0));
        assert_eq!(feasibility_score(&broke), 0.0);
        assert_eq!(cost_score(&broke), 0.0);

        let free = Goal::new("Nothing", GoalCategory::Other, dec!(0), 12, dec!(0));
        assert_eq!(feasibility_score(&free), 100.0);
        assert_eq!(cost_score(&free), 100.0);
    }

    #[test]
    fn test_ranking_and_labels() {
        let report = prioritize(&PriorityWeights::default(), &goals(), None).unwrap();
        let names: Vec<&str> = report.goals.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names[0], "Rainy day");
        assert_eq!(report.goals[0].rank, 1);
        assert_eq!(report.goals[0].priority, PriorityLevel::High);
        for pair in report.goals.windows(2) {
            assert!(pair[0].total_score >= pair[1].total_score);
        }
    }

    #[test]
    fn test_conflicts_follow_priority_order() {
        // Requirements: 500 + 1250 + 1250 against 2000 of capacity
        let report = prioritize(&PriorityWeights::default(), &goals(), Some(dec!(2000))).unwrap();
        let trade = &report.trade_offs;
        assert_eq!(trade.total_monthly_requirement, dec!(3000));
        assert_eq!(trade.total_monthly_capacity, dec!(2000));
        assert_eq!(trade.monthly_gap, dec!(1000));
        assert_eq!(trade.total_funding_needed, dec!(81000));
        assert!(!trade.potential_conflicts.is_empty());
        assert!(!trade.potential_conflicts.contains(&"Rainy day".to_string()));
    }

    #[test]
    fn test_summed_capacity_is_default() {
        let report = prioritize(&PriorityWeights::default(), &goals(), None).unwrap();
        assert_eq!(report.trade_offs.total_monthly_capacity, dec!(2900));
        assert!(report.trade_offs.warnings.is_empty());
    }

    #[test]
    fn test_missing_emergency_fund_warning() {
        let only_fun = vec![goals().remove(0)];
        let report = prioritize(&PriorityWeights::default(), &only_fun, None).unwrap();
        assert!(report
            .trade_offs
            .warnings
            .iter()
            .any(|w| w.contains("No emergency fund")));
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        let twins = vec![
            Goal::new("First", GoalCategory::Other, dec!(20000), 24, dec!(1000)),
            Goal::new("Second", GoalCategory::Other, dec!(20000), 24, dec!(1000)),
        ];
        let report = prioritize(&PriorityWeights::default(), &twins, None).unwrap();
        assert_eq!(report.goals[0].name, "First");
        assert_eq!(report.goals[1].name, "Second");
    }

    #[test]
    fn test_bad_weights_rejected() {
        let weights = PriorityWeights {
            urgency: -1.0,
            ..PriorityWeights::default()
        };
        assert!(prioritize(&weights, &goals(), None).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_emergency_fund_never_below_vacation(
            amount in 0u32..500_000,
            timeline in 1u32..240,
            capacity in 0u32..10_000,
        ) {
            let emergency = Goal::new(
                "Emergency",
                GoalCategory::EmergencyFund,
                Decimal::from(amount),
                timeline,
                Decimal::from(capacity),
            );
            let vacation = Goal {
                name: "Vacation".to_string(),
                category: GoalCategory::Vacation,
                ..emergency.clone()
            };
            let report = prioritize(&PriorityWeights::default(), &[vacation, emergency], None).unwrap();
            let score = |name: &str| {
                report.goals.iter().find(|g| g.name == name).map(|g| g.total_score).unwrap()
            };
            prop_assert!(score("Emergency") >= score("Vacation"));
            prop_assert_eq!(report.goals[0].name.as_str(), "Emergency");
        }
    }
}
