use serde::{Deserialize, Serialize};

/// Tunables for the performance engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    /// Lookback window, in weeks, for the inverse-volatility rolling
    /// estimate. Also how far the price history is extended before the
    /// requested start date so the in-range sample is not consumed by the
    /// estimator.
    pub inverse_vol_lookback_weeks: usize,
}

/// Three years of weekly observations.
pub const DEFAULT_LOOKBACK_WEEKS: usize = 156;

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            inverse_vol_lookback_weeks: DEFAULT_LOOKBACK_WEEKS,
        }
    }
}
