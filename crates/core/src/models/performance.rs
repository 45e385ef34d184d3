use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

use super::analytics::PerformanceSummary;
use super::frame::{DateFrame, DatePoint};

/// Weighting policy used to construct the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weighting {
    /// Every asset with a defined return on a date gets 1/k of the book.
    Equal,
    /// Allocation inversely proportional to a rolling estimate of weekly
    /// return volatility.
    InverseVol,
}

impl std::fmt::Display for Weighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Weighting::Equal => write!(f, "EQUAL"),
            Weighting::InverseVol => write!(f, "INVERSE_VOL"),
        }
    }
}

impl FromStr for Weighting {
    type Err = CoreError;

    /// Parse the policy from its wire name, as selected in a UI dropdown.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("EQUAL") {
            Ok(Weighting::Equal)
        } else if s.eq_ignore_ascii_case("INVERSE_VOL") {
            Ok(Weighting::InverseVol)
        } else {
            Err(CoreError::UnknownWeighting(s.to_string()))
        }
    }
}

/// A data-quality condition observed while computing performance.
///
/// These are per-asset conditions that do not abort the computation; they
/// are surfaced on the result so callers can distinguish "weight excluded"
/// from "weight zero".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceWarning {
    /// A requested ticker had no price series; its column is all-missing,
    /// which implicitly changes weight normalization for the others.
    UnknownTicker { ticker: String },

    /// An asset's rolling volatility was exactly 0 under inverse-vol
    /// weighting. Its raw weight (1/vol) is unbounded, so the asset is
    /// excluded from allocation on the affected dates instead of dominating
    /// the portfolio. `date` is the first affected date.
    DegenerateVolatility { ticker: String, date: NaiveDate },
}

impl std::fmt::Display for PerformanceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PerformanceWarning::UnknownTicker { ticker } => {
                write!(f, "no price series available for {ticker}")
            }
            PerformanceWarning::DegenerateVolatility { ticker, date } => {
                write!(f, "zero rolling volatility for {ticker} from {date}; excluded from allocation")
            }
        }
    }
}

/// Full output of one portfolio performance computation.
///
/// Built fresh per invocation from provider data and never mutated
/// afterwards; the caller owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPerformance {
    /// Tickers the portfolio was built from, in request order.
    pub tickers: Vec<String>,

    /// Weighting policy that produced the weights.
    pub weighting: Weighting,

    /// Portfolio cumulative return, one point per calendar date.
    pub port_cum_perf: Vec<DatePoint>,

    /// Per-stock daily contribution (return × weight).
    pub stock_contributions: DateFrame,

    /// Per-stock daily weight; defined weights sum to 1 on each date.
    pub stock_weights: DateFrame,

    /// Per-sector daily contribution, summed over member stocks.
    pub sector_contributions: DateFrame,

    /// Per-sector daily weight, summed over member stocks.
    pub sector_weights: DateFrame,

    /// Cumulative and annualized statistics for the whole portfolio.
    pub summary: PerformanceSummary,

    /// Data-quality conditions observed along the way.
    pub warnings: Vec<PerformanceWarning>,
}
