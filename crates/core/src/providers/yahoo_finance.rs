use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::info;

use crate::errors::CoreError;
use crate::models::price::PricePoint;
use crate::models::standing::StockStandingData;

use super::traits::StockDataProvider;

/// Yahoo Finance provider for stock price history.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities, ETFs, indices, mutual funds.
/// - **Data**: Full historical OHLCV with split/dividend-adjusted closes.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's public
/// endpoints. Serves price history only: Yahoo carries no GICS sector
/// reference data and cannot enumerate a universe, so `standing_data` and
/// `list_tickers` return `CoreError::Unsupported`; sector-aware flows need
/// a repository with a standing-data table.
///
/// **Note**: Not WASM-compatible (uses native reqwest/tokio).
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<chrono::NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }
}

#[async_trait]
impl StockDataProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn price_series(&self, ticker: &str) -> Result<Vec<PricePoint>, CoreError> {
        info!(ticker, "fetching full price history from Yahoo Finance");

        let start = OffsetDateTime::UNIX_EPOCH;
        let end = OffsetDateTime::now_utc();
        let resp = self
            .connector
            .get_quote_history(ticker, start, end)
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch history for {ticker}: {e}"),
            })?;

        let quotes = resp.quotes().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to parse quotes for {ticker}: {e}"),
        })?;

        if quotes.is_empty() {
            return Err(CoreError::UnknownTicker(ticker.to_string()));
        }

        let mut points = Vec::with_capacity(quotes.len());
        for quote in &quotes {
            let Some(date) = Self::timestamp_to_naive_date(quote.timestamp) else {
                continue;
            };
            if !quote.adjclose.is_finite() || quote.adjclose <= 0.0 {
                return Err(CoreError::InvalidPrice {
                    ticker: ticker.to_string(),
                    date,
                    value: quote.adjclose,
                });
            }
            points.push(PricePoint {
                date,
                adjusted_close: quote.adjclose,
            });
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    async fn standing_data(
        &self,
        _tickers: &[String],
    ) -> Result<Vec<StockStandingData>, CoreError> {
        Err(CoreError::Unsupported {
            provider: "Yahoo Finance".into(),
            operation: "standing data".into(),
        })
    }

    async fn list_tickers(&self) -> Result<Vec<String>, CoreError> {
        Err(CoreError::Unsupported {
            provider: "Yahoo Finance".into(),
            operation: "ticker enumeration".into(),
        })
    }
}
