use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::frame::DateFrame;
use crate::models::performance::{PerformanceWarning, Weighting};
use crate::providers::traits::StockDataProvider;

use super::return_service::ReturnService;

/// Weights produced by a strategy, plus any data-quality conditions it hit.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightOutcome {
    pub weights: DateFrame,
    pub warnings: Vec<PerformanceWarning>,
}

/// A weighting policy: turns a return frame into a weight frame with the
/// same calendar and columns.
///
/// Invariant: on every date with at least one defined weight, the defined
/// weights sum to 1. Cells are missing wherever the underlying return is
/// missing; no weight without a return.
pub trait WeightStrategy {
    fn name(&self) -> &'static str;

    /// Whether `compute_weights` wants pre-range return history to seed its
    /// estimator.
    fn needs_extended_history(&self) -> bool;

    /// `extended` holds returns strictly before the frame's calendar, when
    /// the strategy asked for them and any exist.
    fn compute_weights(
        &self,
        returns: &DateFrame,
        extended: Option<&DateFrame>,
    ) -> Result<WeightOutcome, CoreError>;
}

/// On each date, every asset with a defined return gets 1/k of the book,
/// where k is the number of such assets that date.
pub struct EqualWeight;

impl WeightStrategy for EqualWeight {
    fn name(&self) -> &'static str {
        "equal"
    }

    fn needs_extended_history(&self) -> bool {
        false
    }

    fn compute_weights(
        &self,
        returns: &DateFrame,
        _extended: Option<&DateFrame>,
    ) -> Result<WeightOutcome, CoreError> {
        let mut weights = DateFrame::new(returns.dates().to_vec(), returns.columns().to_vec());
        for row in 0..returns.dates().len() {
            let k = returns.row_defined_count(row);
            if k == 0 {
                continue;
            }
            let day_weight = 1.0 / k as f64;
            for col in 0..returns.columns().len() {
                if returns.get(row, col).is_some() {
                    weights.set(row, col, Some(day_weight));
                }
            }
        }
        Ok(WeightOutcome {
            weights,
            warnings: Vec::new(),
        })
    }
}

/// Allocation inversely proportional to a rolling estimate of weekly return
/// volatility.
///
/// Daily returns (extended history prepended) are resampled to weekly
/// returns on weeks ending Friday, a rolling sample standard deviation with
/// window `lookback_weeks` (at least `lookback_weeks / 2` observations) is
/// taken over the weekly series, and each requested date picks up the
/// volatility of the latest completed week label at or before it. Raw
/// weight is 1/vol, normalized per date.
///
/// A volatility of exactly 0 makes 1/vol unbounded; such cells are excluded
/// from allocation and reported as `DegenerateVolatility` instead of being
/// allowed to dominate the portfolio.
pub struct InverseVolatility {
    pub lookback_weeks: usize,
}

impl WeightStrategy for InverseVolatility {
    fn name(&self) -> &'static str {
        "inverse-vol"
    }

    fn needs_extended_history(&self) -> bool {
        true
    }

    fn compute_weights(
        &self,
        returns: &DateFrame,
        extended: Option<&DateFrame>,
    ) -> Result<WeightOutcome, CoreError> {
        let combined = match extended {
            Some(pre) => pre.stack(returns),
            None => returns.clone(),
        };

        // One label per Friday across the combined span, so positional
        // rolling windows line up with calendar weeks.
        let first_label = week_end_friday(combined.dates()[0]);
        let last_label = week_end_friday(*combined.dates().last().unwrap());
        let n_weeks = ((last_label - first_label).num_days() / 7) as usize + 1;

        let mut weights = DateFrame::new(returns.dates().to_vec(), returns.columns().to_vec());
        let mut warnings = Vec::new();
        let mut vol_by_column: Vec<Vec<Option<f64>>> = Vec::with_capacity(returns.columns().len());

        for name in returns.columns() {
            let combined_col = combined.column_index(name).unwrap();
            let weekly = weekly_returns(&combined, combined_col, first_label, n_weeks);
            let weekly_vol = rolling_std(&weekly, self.lookback_weeks);

            // Forward-fill each week's volatility across the requested dates.
            let daily: Vec<Option<f64>> = returns
                .dates()
                .iter()
                .map(|&date| {
                    let label = latest_friday(date);
                    if label < first_label || label > last_label {
                        return None;
                    }
                    let idx = ((label - first_label).num_days() / 7) as usize;
                    weekly_vol[idx]
                })
                .collect();
            vol_by_column.push(daily);
        }

        for (col, ticker) in returns.columns().iter().enumerate() {
            let mut degenerate_reported = false;
            for row in 0..returns.dates().len() {
                if returns.get(row, col).is_none() {
                    continue;
                }
                let Some(vol) = vol_by_column[col][row] else {
                    continue; // insufficient history, no weight assigned
                };
                if vol == 0.0 {
                    if !degenerate_reported {
                        warnings.push(PerformanceWarning::DegenerateVolatility {
                            ticker: ticker.clone(),
                            date: returns.dates()[row],
                        });
                        degenerate_reported = true;
                    }
                    continue;
                }
                weights.set(row, col, Some(1.0 / vol));
            }
        }

        normalize_rows(&mut weights);
        Ok(WeightOutcome { weights, warnings })
    }
}

/// Computes a per-asset, per-day weight under the chosen policy.
///
/// Fetches the extended pre-range history for strategies that need it (so
/// the volatility estimate does not consume the in-range sample), then
/// dispatches to the strategy.
pub struct WeightService {
    return_service: ReturnService,
}

impl WeightService {
    pub fn new() -> Self {
        Self {
            return_service: ReturnService::new(),
        }
    }

    pub async fn compute_weights(
        &self,
        provider: &dyn StockDataProvider,
        returns: &DateFrame,
        tickers: &[String],
        weighting: Weighting,
        lookback_weeks: usize,
    ) -> Result<WeightOutcome, CoreError> {
        let strategy: Box<dyn WeightStrategy> = match weighting {
            Weighting::Equal => Box::new(EqualWeight),
            Weighting::InverseVol => Box::new(InverseVolatility { lookback_weeks }),
        };
        info!(strategy = strategy.name(), "computing weights");

        let extended = if strategy.needs_extended_history() {
            self.extended_history(provider, returns, tickers, lookback_weeks)
                .await?
        } else {
            None
        };

        strategy.compute_weights(returns, extended.as_ref())
    }

    /// Returns for the `lookback_weeks` weeks ending the business day
    /// before the frame's first date. `None` when no pre-range data exists
    /// (young assets); the estimator then warms up inside the range.
    async fn extended_history(
        &self,
        provider: &dyn StockDataProvider,
        returns: &DateFrame,
        tickers: &[String],
        lookback_weeks: usize,
    ) -> Result<Option<DateFrame>, CoreError> {
        let ext_to = previous_business_day(returns.dates()[0]);
        let ext_from = ext_to - Duration::weeks(lookback_weeks as i64);
        debug!(%ext_from, %ext_to, "extending history for volatility estimation");

        match self
            .return_service
            .stock_returns(provider, ext_from, ext_to, Some(tickers))
            .await
        {
            Ok(pre) => Ok(Some(pre.returns)),
            Err(CoreError::EmptyCalendar) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Default for WeightService {
    fn default() -> Self {
        Self::new()
    }
}

/// The Friday ending the week that contains `date`; Saturday and Sunday
/// observations roll into the following Friday's week.
fn week_end_friday(date: NaiveDate) -> NaiveDate {
    let days_ahead = (4 + 7 - date.weekday().num_days_from_monday() as i64) % 7;
    date + Duration::days(days_ahead)
}

/// The latest Friday at or before `date`.
fn latest_friday(date: NaiveDate) -> NaiveDate {
    let days_back = (date.weekday().num_days_from_monday() as i64 + 7 - 4) % 7;
    date - Duration::days(days_back)
}

/// Step back to the last weekday strictly before `date`.
fn previous_business_day(date: NaiveDate) -> NaiveDate {
    let mut day = date - Duration::days(1);
    while matches!(day.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
        day -= Duration::days(1);
    }
    day
}

/// Compound one column's daily returns into weekly returns over `n_weeks`
/// consecutive week slots starting at `first_label`. A week with no defined
/// daily observation stays missing.
fn weekly_returns(
    frame: &DateFrame,
    col: usize,
    first_label: NaiveDate,
    n_weeks: usize,
) -> Vec<Option<f64>> {
    let mut weekly: Vec<Option<f64>> = vec![None; n_weeks];
    for (row, &date) in frame.dates().iter().enumerate() {
        let Some(value) = frame.get(row, col) else {
            continue;
        };
        let idx = ((week_end_friday(date) - first_label).num_days() / 7) as usize;
        let compounded = weekly[idx].map_or(1.0 + value, |w| (1.0 + w) * (1.0 + value));
        weekly[idx] = Some(compounded - 1.0);
    }
    weekly
}

/// Rolling sample standard deviation (ddof = 1) over a weekly series.
///
/// A window produces a value only when it holds at least
/// `window / 2` defined observations, and never fewer than 2: a sample
/// deviation of one point is undefined.
fn rolling_std(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let min_periods = (window / 2).max(2);
    let mut out = vec![None; series.len()];
    for i in 0..series.len() {
        let start = (i + 1).saturating_sub(window);
        let values: Vec<f64> = series[start..=i].iter().filter_map(|v| *v).collect();
        if values.len() < min_periods {
            continue;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        out[i] = Some(var.sqrt());
    }
    out
}

/// Divide each row's defined cells by the row sum, so defined weights sum
/// to 1 per date.
fn normalize_rows(frame: &mut DateFrame) {
    for row in 0..frame.dates().len() {
        let sum = frame.row_sum(row);
        if sum <= 0.0 {
            continue;
        }
        for col in 0..frame.columns().len() {
            if let Some(value) = frame.get(row, col) {
                frame.set(row, col, Some(value / sum));
            }
        }
    }
}
