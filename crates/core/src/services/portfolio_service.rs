use chrono::NaiveDate;
use tracing::info;

use crate::errors::CoreError;
use crate::models::frame::DateFrame;
use crate::models::performance::{PerformanceWarning, PortfolioPerformance, Weighting};
use crate::models::standing::StockStandingData;
use crate::providers::traits::StockDataProvider;

use super::analytics_service::AnalyticsService;
use super::return_service::ReturnService;
use super::weight_service::WeightService;

/// Orchestrates the performance pipeline: returns → weights →
/// contributions → sector aggregates → summary statistics.
///
/// One invocation is a single pass over freshly derived data; nothing is
/// memoized here, so identical inputs always produce identical results.
pub struct PortfolioService {
    return_service: ReturnService,
    weight_service: WeightService,
    analytics_service: AnalyticsService,
}

impl PortfolioService {
    pub fn new() -> Self {
        Self {
            return_service: ReturnService::new(),
            weight_service: WeightService::new(),
            analytics_service: AnalyticsService::new(),
        }
    }

    /// Calculate cumulative portfolio performance between dates.
    ///
    /// `lookback_weeks` only matters under `Weighting::InverseVol`.
    pub async fn calculate_portfolio_performance(
        &self,
        provider: &dyn StockDataProvider,
        from: NaiveDate,
        to: NaiveDate,
        tickers: &[String],
        weighting: Weighting,
        lookback_weeks: usize,
    ) -> Result<PortfolioPerformance, CoreError> {
        info!(
            assets = tickers.len(),
            %from,
            %to,
            %weighting,
            "calculating portfolio performance"
        );
        if tickers.is_empty() {
            return Err(CoreError::NoTickers);
        }

        // Extract stock return data
        let stock_returns = self
            .return_service
            .stock_returns(provider, from, to, Some(tickers))
            .await?;
        let returns = stock_returns.returns;

        let mut warnings: Vec<PerformanceWarning> = stock_returns
            .unknown_tickers
            .into_iter()
            .map(|ticker| PerformanceWarning::UnknownTicker { ticker })
            .collect();

        // Determine the weights on any day
        let outcome = self
            .weight_service
            .compute_weights(provider, &returns, tickers, weighting, lookback_weeks)
            .await?;
        warnings.extend(outcome.warnings);
        let weights = outcome.weights;

        // Daily stock contributions, then the portfolio's own daily return
        let contributions = returns.multiply(&weights);
        let port_returns: Vec<f64> = (0..contributions.dates().len())
            .map(|row| contributions.row_sum(row))
            .collect();

        // Sector contributions and weights
        let standing = provider.standing_data(tickers).await?;
        let (sector_contributions, sector_weights) =
            Self::aggregate_sectors(&contributions, &weights, &standing, tickers);

        let port_cum_perf = self
            .analytics_service
            .cumulative_series(returns.dates(), &port_returns);
        let summary = self.analytics_service.summarize(&port_returns);

        Ok(PortfolioPerformance {
            tickers: tickers.to_vec(),
            weighting,
            port_cum_perf,
            stock_contributions: contributions,
            stock_weights: weights,
            sector_contributions,
            sector_weights,
            summary,
            warnings,
        })
    }

    /// Sum contributions and weights over the stocks of each sector.
    ///
    /// Sectors are the distinct sectors of the requested tickers present in
    /// standing data, in first-seen order; a ticker missing from standing
    /// data contributes to no sector. Sector cells are always defined;
    /// missing member cells count as 0.
    fn aggregate_sectors(
        contributions: &DateFrame,
        weights: &DateFrame,
        standing: &[StockStandingData],
        tickers: &[String],
    ) -> (DateFrame, DateFrame) {
        let rows: Vec<_> = standing
            .iter()
            .filter(|row| tickers.contains(&row.symbol))
            .collect();

        let mut sectors: Vec<String> = Vec::new();
        for row in &rows {
            if !sectors.contains(&row.sector) {
                sectors.push(row.sector.clone());
            }
        }

        let calendar = contributions.dates().to_vec();
        let mut sector_contr = DateFrame::new(calendar.clone(), sectors.clone());
        let mut sector_wgt = DateFrame::new(calendar, sectors.clone());

        for (sector_col, sector) in sectors.iter().enumerate() {
            let member_cols: Vec<usize> = rows
                .iter()
                .filter(|row| &row.sector == sector)
                .filter_map(|row| contributions.column_index(&row.symbol))
                .collect();

            for row in 0..contributions.dates().len() {
                let contr: f64 = member_cols
                    .iter()
                    .filter_map(|&col| contributions.get(row, col))
                    .sum();
                let wgt: f64 = member_cols
                    .iter()
                    .filter_map(|&col| weights.get(row, col))
                    .sum();
                sector_contr.set(row, sector_col, Some(contr));
                sector_wgt.set(row, sector_col, Some(wgt));
            }
        }

        (sector_contr, sector_wgt)
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
