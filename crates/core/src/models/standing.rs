use serde::{Deserialize, Serialize};

/// Standing (reference) data for one listed stock.
///
/// Many tickers map to one sector; a ticker missing from standing data is
/// simply excluded from sector aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockStandingData {
    /// Ticker symbol, e.g. "MSFT".
    pub symbol: String,

    /// Company name, e.g. "Microsoft Corporation".
    pub security: String,

    /// GICS sector label, e.g. "Information Technology".
    pub sector: String,
}
