use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::price::PricePoint;
use crate::models::standing::StockStandingData;

/// Trait abstraction for stock price/reference data sources.
///
/// The performance engine only ever talks to this trait: providers are
/// injected into the facade, never constructed inside the engine. Swapping
/// the CSV repository for the Yahoo Finance provider (or a test mock)
/// touches nothing downstream.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait StockDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Full adjusted-close price history for one ticker, ascending by date.
    ///
    /// Returns `CoreError::UnknownTicker` when the provider has no series
    /// for the symbol.
    async fn price_series(&self, ticker: &str) -> Result<Vec<PricePoint>, CoreError>;

    /// Standing data (sector classification) for the requested tickers.
    /// A provider may return a superset; the engine filters.
    async fn standing_data(
        &self,
        tickers: &[String],
    ) -> Result<Vec<StockStandingData>, CoreError>;

    /// Every ticker this provider can serve prices for. Used when the
    /// caller asks for "all assets" instead of an explicit list.
    async fn list_tickers(&self) -> Result<Vec<String>, CoreError>;
}
