//! Descriptive statistics over simulation outcomes

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::to_money;

/// Mean, extremes and population standard deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    pub standard_deviation: Decimal,
}

impl SummaryStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: Decimal::ZERO,
                min: Decimal::ZERO,
                max: Decimal::ZERO,
                standard_deviation: Decimal::ZERO,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean: to_money(mean),
            min: to_money(min),
            max: to_money(max),
            standard_deviation: to_money(variance.sqrt()),
        }
    }
}

/// Nearest-rank percentile of an ascending slice
///
/// Returns the value at index `ceil(p / 100 * n) - 1`, clamped to the slice.
pub fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (p / 100.0 * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

/// Sorted copy of `values`
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Balance percentiles reported by Monte Carlo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: Decimal,
    pub p10: Decimal,
    pub p25: Decimal,
    pub p50: Decimal,
    pub p75: Decimal,
    pub p90: Decimal,
    pub p95: Decimal,
}

impl Percentiles {
    pub fn from_sorted(sorted: &[f64]) -> Self {
        let at = |p: f64| to_money(nearest_rank(sorted, p));
        Self {
            p5: at(5.0),
            p10: at(10.0),
            p25: at(25.0),
            p50: at(50.0),
            p75: at(75.0),
            p90: at(90.0),
            p95: at(95.0),
        }
    }
}

/// The three income percentiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomePercentiles {
    pub p5: Decimal,
    pub p50: Decimal,
    pub p95: Decimal,
}

impl IncomePercentiles {
    pub fn from_sorted(sorted: &[f64]) -> Self {
        Self {
            p5: to_money(nearest_rank(sorted, 5.0)),
            p50: to_money(nearest_rank(sorted, 50.0)),
            p95: to_money(nearest_rank(sorted, 95.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_nearest_rank() {
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        assert_eq!(nearest_rank(&values, 5.0), 1.0);
        assert_eq!(nearest_rank(&values, 50.0), 10.0);
        assert_eq!(nearest_rank(&values, 95.0), 19.0);
        assert_eq!(nearest_rank(&values, 100.0), 20.0);
        assert_eq!(nearest_rank(&values, 0.0), 1.0);
        assert_eq!(nearest_rank(&[], 50.0), 0.0);
    }

    #[test]
    fn test_single_value() {
        let p = Percentiles::from_sorted(&[42.0]);
        assert_eq!(p.p5, dec!(42));
        assert_eq!(p.p95, dec!(42));
    }

    #[test]
    fn test_summary_stats() {
        let stats = SummaryStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.mean, dec!(5));
        assert_eq!(stats.min, dec!(2));
        assert_eq!(stats.max, dec!(9));
        assert_eq!(stats.standard_deviation, dec!(2));
    }

    #[test]
    fn test_sorted_handles_unordered_input() {
        assert_eq!(sorted(&[3.0, 1.0, 2.0]), vec![1.0, 2.0, 3.0]);
    }
}
