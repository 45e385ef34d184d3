pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::NaiveDate;
use std::sync::Arc;

use errors::CoreError;
use models::{
    frame::DateFrame,
    performance::{PortfolioPerformance, Weighting},
    settings::AnalyticsSettings,
};
use providers::traits::StockDataProvider;
use services::{portfolio_service::PortfolioService, return_service::ReturnService};

/// Main entry point for the portfolio analytics core library.
///
/// Holds the injected stock data provider and the stateless services that
/// operate on it. The provider is a required constructor argument; the
/// engine never builds a data source on its own, so tests and embedders
/// decide where prices come from.
#[must_use]
pub struct PortfolioAnalytics {
    provider: Arc<dyn StockDataProvider>,
    settings: AnalyticsSettings,
    return_service: ReturnService,
    portfolio_service: PortfolioService,
}

impl std::fmt::Debug for PortfolioAnalytics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioAnalytics")
            .field("provider", &self.provider.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl PortfolioAnalytics {
    /// Create an engine over a data provider with default settings.
    pub fn new(provider: Arc<dyn StockDataProvider>) -> Self {
        Self::with_settings(provider, AnalyticsSettings::default())
    }

    /// Create an engine with explicit settings.
    pub fn with_settings(provider: Arc<dyn StockDataProvider>, settings: AnalyticsSettings) -> Self {
        Self {
            provider,
            settings,
            return_service: ReturnService::new(),
            portfolio_service: PortfolioService::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    // ── Returns ─────────────────────────────────────────────────────

    /// Every ticker the provider can serve prices for.
    pub async fn available_tickers(&self) -> Result<Vec<String>, CoreError> {
        self.provider.list_tickers().await
    }

    /// Daily returns over `[from, to]` inclusive, aligned on the union
    /// calendar of the requested tickers (`None` = all available).
    pub async fn stock_returns(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        tickers: Option<&[String]>,
    ) -> Result<DateFrame, CoreError> {
        let result = self
            .return_service
            .stock_returns(self.provider.as_ref(), from, to, tickers)
            .await?;
        Ok(result.returns)
    }

    /// Cumulative daily returns over `[from, to]` inclusive.
    pub async fn cumulative_stock_returns(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        tickers: Option<&[String]>,
    ) -> Result<DateFrame, CoreError> {
        let result = self
            .return_service
            .cumulative_stock_returns(self.provider.as_ref(), from, to, tickers)
            .await?;
        Ok(result.returns)
    }

    // ── Portfolio performance ───────────────────────────────────────

    /// Calculate cumulative portfolio performance between dates under the
    /// chosen weighting policy.
    pub async fn calculate_portfolio_performance(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        tickers: &[String],
        weighting: Weighting,
    ) -> Result<PortfolioPerformance, CoreError> {
        self.portfolio_service
            .calculate_portfolio_performance(
                self.provider.as_ref(),
                from,
                to,
                tickers,
                weighting,
                self.settings.inverse_vol_lookback_weeks,
            )
            .await
    }
}
