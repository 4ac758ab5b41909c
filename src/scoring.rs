//! Nine fixed-weight investment heuristics over a financial series.
//!
//! Each rule awards its full points or nothing. Trend rules need a strictly
//! positive least-squares slope (a flat series fails); threshold rules use
//! inclusive bounds (a value exactly at the threshold passes).
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::models::{FinancialSeries, Metric, ScoreResult};

/// Condition a metric's values must satisfy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    /// slope > 0
    TrendUp,
    /// every value > 0 and slope > 0
    PositiveTrendUp,
    /// every value >= bound
    AtLeast(f64),
    /// every value <= bound
    AtMost(f64),
    /// never decreases year over year and slope > 0
    NonDecreasingTrendUp,
}

impl Condition {
    pub fn holds(&self, values: &[f64]) -> bool {
        match *self {
            Condition::TrendUp => slope(values) > 0.0,
            Condition::PositiveTrendUp => values.iter().all(|v| *v > 0.0) && slope(values) > 0.0,
            Condition::AtLeast(bound) => values.iter().all(|v| *v >= bound),
            Condition::AtMost(bound) => values.iter().all(|v| *v <= bound),
            Condition::NonDecreasingTrendUp => {
                values.windows(2).all(|w| w[1] >= w[0]) && slope(values) > 0.0
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringRule {
    pub metric: Metric,
    pub max_points: f64,
    pub condition: Condition,
}

impl ScoringRule {
    /// Points awarded for `values`: all or nothing.
    pub fn award(&self, values: &[f64]) -> f64 {
        if self.condition.holds(values) {
            self.max_points
        } else {
            0.0
        }
    }
}

pub const RULES: [ScoringRule; 9] = [
    ScoringRule {
        metric: Metric::Revenue,
        max_points: 15.0,
        condition: Condition::TrendUp,
    },
    ScoringRule {
        metric: Metric::Eps,
        max_points: 15.0,
        condition: Condition::TrendUp,
    },
    ScoringRule {
        metric: Metric::TotalAssets,
        max_points: 10.0,
        condition: Condition::TrendUp,
    },
    ScoringRule {
        metric: Metric::OperatingCf,
        max_points: 10.0,
        condition: Condition::PositiveTrendUp,
    },
    ScoringRule {
        metric: Metric::CashEquivalents,
        max_points: 10.0,
        condition: Condition::TrendUp,
    },
    ScoringRule {
        metric: Metric::Roe,
        max_points: 10.0,
        condition: Condition::AtLeast(7.0),
    },
    ScoringRule {
        metric: Metric::EquityRatio,
        max_points: 10.0,
        condition: Condition::AtLeast(50.0),
    },
    ScoringRule {
        metric: Metric::DividendPerShare,
        max_points: 10.0,
        condition: Condition::NonDecreasingTrendUp,
    },
    ScoringRule {
        metric: Metric::DividendPayoutRatio,
        max_points: 10.0,
        condition: Condition::AtMost(40.0),
    },
];

/// Fewer fiscal years than this cannot show a trend; the score is zero.
pub const MIN_YEARS: usize = 2;

/// Ordinary least-squares slope of `values` against their index `0..n`.
/// Returns 0.0 for fewer than two points.
pub fn slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;

    // Centered x is antisymmetric, so pair year i with year n-1-i; equal
    // values then cancel exactly and a flat series has slope 0.0.
    let covariance: f64 = (0..n / 2)
        .map(|i| {
            let j = n - 1 - i;
            (j as f64 - x_mean) * (values[j] - values[i])
        })
        .sum();
    let variance: f64 = (0..n).map(|i| (i as f64 - x_mean).powi(2)).sum();

    covariance / variance
}

/// Score a series against every rule in [`RULES`].
#[instrument(skip(series), fields(ticker = %series.ticker, years = series.year_count()))]
pub fn score(series: &FinancialSeries) -> ScoreResult {
    let sufficient = series.year_count() >= MIN_YEARS;
    if !sufficient {
        debug!("Fewer than {} fiscal years, scoring zero", MIN_YEARS);
    }

    let breakdown: BTreeMap<Metric, f64> = RULES
        .iter()
        .map(|rule| {
            let points = if sufficient {
                rule.award(series.values(rule.metric))
            } else {
                0.0
            };
            (rule.metric, points)
        })
        .collect();

    let total_score: f64 = breakdown.values().sum();
    debug!("Total score {} ({:?})", total_score, breakdown);

    ScoreResult {
        ticker: series.ticker.clone(),
        total_score,
        breakdown,
        financial_data: series.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope_of_line() {
        assert!((slope(&[1.0, 2.0, 3.0, 4.0]) - 1.0).abs() < 1e-12);
        assert!((slope(&[10.0, 8.0, 6.0]) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_slope_short_input_is_zero() {
        assert_eq!(slope(&[]), 0.0);
        assert_eq!(slope(&[42.0]), 0.0);
    }

    #[test]
    fn test_slope_flat_is_exactly_zero() {
        assert_eq!(slope(&[1000.0; 5]), 0.0);
        assert_eq!(slope(&[0.1, 0.1, 0.1]), 0.0);
        assert_eq!(slope(&[7.3; 4]), 0.0);
    }

    #[test]
    fn test_slope_noisy_upward_trend() {
        // Dips in the middle, but the fitted line still rises
        assert!(slope(&[100.0, 90.0, 120.0, 110.0, 130.0]) > 0.0);
    }

    #[test]
    fn test_rule_weights_sum_to_100() {
        let total: f64 = RULES.iter().map(|r| r.max_points).sum();
        assert_eq!(total, 100.0);
        assert_eq!(RULES.len(), Metric::ALL.len());
    }

    #[test]
    fn test_positive_trend_requires_every_year_positive() {
        assert!(Condition::PositiveTrendUp.holds(&[1.0, 2.0, 3.0]));
        assert!(!Condition::PositiveTrendUp.holds(&[-10.0, 20.0, 30.0]));
        assert!(!Condition::PositiveTrendUp.holds(&[0.0, 20.0, 30.0]));
    }

    #[test]
    fn test_non_decreasing_trend() {
        assert!(Condition::NonDecreasingTrendUp.holds(&[10.0, 10.0, 12.0, 12.0, 15.0]));
        assert!(!Condition::NonDecreasingTrendUp.holds(&[10.0, 12.0, 11.0, 15.0]));
        // Flat dividends never cut, but do not grow either
        assert!(!Condition::NonDecreasingTrendUp.holds(&[10.0, 10.0, 10.0]));
    }

    #[test]
    fn test_threshold_bounds_are_inclusive() {
        assert!(Condition::AtLeast(7.0).holds(&[7.0, 7.0, 7.0]));
        assert!(!Condition::AtLeast(7.0).holds(&[6.99, 7.0, 7.0]));
        assert!(Condition::AtMost(40.0).holds(&[40.0, 12.0]));
        assert!(!Condition::AtMost(40.0).holds(&[40.01]));
    }
}
