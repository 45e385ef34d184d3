use serde::{Deserialize, Serialize};

/// Cumulative and annualized statistics for a portfolio return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Cumulative return over the whole period: Π(1 + r) − 1.
    pub cumulative_return: f64,

    /// (1 + cumulative)^(252 / observations) − 1.
    pub annualized_return: f64,

    /// Sample standard deviation of daily returns × √252.
    pub annualized_volatility: f64,

    /// Annualized return ÷ annualized volatility. `None` when volatility is
    /// 0: the ratio is undefined, never coerced to a number.
    pub sharpe_ratio: Option<f64>,

    /// Number of daily return observations the statistics are based on.
    pub observations: usize,
}
