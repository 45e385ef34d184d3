use chrono::NaiveDate;

use crate::models::analytics::PerformanceSummary;
use crate::models::frame::DatePoint;

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Derives cumulative and annualized statistics from a portfolio daily
/// return series.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Compound daily returns into a cumulative return series:
    /// `cum[t] = Π(1 + r[0..=t]) − 1`.
    pub fn cumulative_series(&self, dates: &[NaiveDate], returns: &[f64]) -> Vec<DatePoint> {
        debug_assert_eq!(dates.len(), returns.len());
        let mut acc = 1.0;
        dates
            .iter()
            .zip(returns)
            .map(|(&date, &value)| {
                acc *= 1.0 + value;
                DatePoint {
                    date,
                    value: acc - 1.0,
                }
            })
            .collect()
    }

    /// Summarize a daily return series into cumulative and annualized
    /// statistics (252-trading-day convention).
    ///
    /// The Sharpe ratio is `None` when annualized volatility is 0: 0/0 is
    /// undefined and must stay distinguishable from a computed 0.
    pub fn summarize(&self, returns: &[f64]) -> PerformanceSummary {
        let observations = returns.len();
        let cumulative_return = returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0;

        let annualized_return = if observations == 0 {
            0.0
        } else {
            (1.0 + cumulative_return).powf(TRADING_DAYS_PER_YEAR / observations as f64) - 1.0
        };

        let annualized_volatility = sample_std(returns) * TRADING_DAYS_PER_YEAR.sqrt();

        let sharpe_ratio = if annualized_volatility == 0.0 {
            None
        } else {
            Some(annualized_return / annualized_volatility)
        };

        PerformanceSummary {
            cumulative_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            observations,
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample standard deviation (ddof = 1); 0 for fewer than two observations.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}
