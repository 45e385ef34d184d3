use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::frame::{DateFrame, DatePoint};
use crate::models::price::PricePoint;
use crate::providers::traits::StockDataProvider;

/// Result of a return computation: the aligned return frame plus the
/// tickers that had no price series at all (their columns are all-missing).
#[derive(Debug, Clone, PartialEq)]
pub struct StockReturns {
    pub returns: DateFrame,
    pub unknown_tickers: Vec<String>,
}

/// Converts price series into daily percentage returns aligned on a shared
/// calendar.
///
/// The calendar is the union of the observed trading dates of all requested
/// tickers within range; a date one asset traded and another did not yields
/// a missing cell for the latter, not an error.
pub struct ReturnService;

impl ReturnService {
    pub fn new() -> Self {
        Self
    }

    /// Compute daily returns for the tickers over `[from, to]` inclusive.
    ///
    /// `tickers = None` means all tickers the provider can serve. Each
    /// ticker's first in-range observation is assigned return 0 rather than
    /// missing, so cumulative compounding starts cleanly at 0 for every
    /// asset regardless of alignment gaps.
    pub async fn stock_returns(
        &self,
        provider: &dyn StockDataProvider,
        from: NaiveDate,
        to: NaiveDate,
        tickers: Option<&[String]>,
    ) -> Result<StockReturns, CoreError> {
        if from > to {
            return Err(CoreError::InvalidDateRange { from, to });
        }

        let tickers: Vec<String> = match tickers {
            Some([]) => return Err(CoreError::NoTickers),
            Some(list) => list.to_vec(),
            None => {
                let all = provider.list_tickers().await?;
                if all.is_empty() {
                    return Err(CoreError::NoTickers);
                }
                all
            }
        };

        let mut series: Vec<(String, Vec<DatePoint>)> = Vec::with_capacity(tickers.len());
        let mut unknown_tickers = Vec::new();
        for ticker in &tickers {
            match provider.price_series(ticker).await {
                Ok(prices) => {
                    let returns = Self::daily_returns(&prices, from, to);
                    debug!(%ticker, observations = returns.len(), "computed daily returns");
                    series.push((ticker.clone(), returns));
                }
                Err(CoreError::UnknownTicker(_)) => {
                    warn!(%ticker, "no price series available; column stays all-missing");
                    unknown_tickers.push(ticker.clone());
                    series.push((ticker.clone(), Vec::new()));
                }
                Err(e) => return Err(e),
            }
        }

        let returns = DateFrame::from_series(&series);
        if returns.is_empty() {
            return Err(CoreError::EmptyCalendar);
        }

        Ok(StockReturns {
            returns,
            unknown_tickers,
        })
    }

    /// Compound the daily returns of `stock_returns` into per-ticker
    /// cumulative return series.
    pub async fn cumulative_stock_returns(
        &self,
        provider: &dyn StockDataProvider,
        from: NaiveDate,
        to: NaiveDate,
        tickers: Option<&[String]>,
    ) -> Result<StockReturns, CoreError> {
        let StockReturns {
            returns,
            unknown_tickers,
        } = self.stock_returns(provider, from, to, tickers).await?;
        Ok(StockReturns {
            returns: returns.cumulative(),
            unknown_tickers,
        })
    }

    /// Day-over-day percentage change of adjusted close, restricted to
    /// `[from, to]`. The first in-range observation gets return 0.
    fn daily_returns(prices: &[PricePoint], from: NaiveDate, to: NaiveDate) -> Vec<DatePoint> {
        let in_range: Vec<_> = prices
            .iter()
            .filter(|p| p.date >= from && p.date <= to)
            .collect();

        let mut returns = Vec::with_capacity(in_range.len());
        for (i, point) in in_range.iter().enumerate() {
            let value = if i == 0 {
                0.0
            } else {
                point.adjusted_close / in_range[i - 1].adjusted_close - 1.0
            };
            returns.push(DatePoint {
                date: point.date,
                value,
            });
        }
        returns
    }
}

impl Default for ReturnService {
    fn default() -> Self {
        Self::new()
    }
}
