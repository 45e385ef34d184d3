use chrono::NaiveDate;
use thiserror::Error;

/// Unified error type for the entire portfolio-analytics-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input validation ────────────────────────────────────────────
    #[error("Invalid date range: from {from} is after to {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    #[error("No price observations in range for any requested ticker")]
    EmptyCalendar,

    #[error("At least one ticker must be requested")]
    NoTickers,

    #[error("Unknown weighting policy: {0}")]
    UnknownWeighting(String),

    // ── Data quality ────────────────────────────────────────────────
    #[error("No price series available for ticker: {0}")]
    UnknownTicker(String),

    #[error("Invalid adjusted close for {ticker} on {date}: {value} (must be finite and positive)")]
    InvalidPrice {
        ticker: String,
        date: NaiveDate,
        value: f64,
    },

    // ── Provider / File I/O ─────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Provider {provider} does not support {operation}")]
    Unsupported {
        provider: String,
        operation: String,
    },
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Csv(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}
