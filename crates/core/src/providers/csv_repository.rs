use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::price::{PricePoint, PriceSeriesCache, DEFAULT_CACHE_CAPACITY};
use crate::models::standing::StockStandingData;

use super::traits::StockDataProvider;

/// Default file name for the standing-data table inside the data directory.
pub const DEFAULT_STANDING_DATA_FILE: &str = "standing_data.csv";

/// Stock data repository backed by a directory of CSV files.
///
/// - One `{TICKER}.csv` per stock in Yahoo Finance export layout (`Date`,
///   `Open`, ..., `Adj Close`, ...). Only `Date` and `Adj Close` are read.
/// - One standing-data CSV (`Symbol`, `Security`, `GICS Sector` columns)
///   holding sector classification for the whole universe.
///
/// Parsed price series go through a bounded LRU cache (see
/// `PriceSeriesCache` for the eviction policy); the standing table is read
/// once and kept for the repository's lifetime. File reads are synchronous;
/// series are small and parsed once per cache residency.
pub struct CsvStockRepository {
    data_dir: PathBuf,
    standing_data_file: String,
    series_cache: Mutex<PriceSeriesCache>,
    standing_cache: Mutex<Option<Vec<StockStandingData>>>,
}

impl CsvStockRepository {
    /// Open a repository over a data directory, with the default
    /// standing-data file name and cache capacity.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            standing_data_file: DEFAULT_STANDING_DATA_FILE.to_string(),
            series_cache: Mutex::new(PriceSeriesCache::new(DEFAULT_CACHE_CAPACITY)),
            standing_cache: Mutex::new(None),
        }
    }

    /// Override the standing-data file name.
    pub fn with_standing_data_file(mut self, file_name: impl Into<String>) -> Self {
        self.standing_data_file = file_name.into();
        self
    }

    /// Override the price-series cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.series_cache = Mutex::new(PriceSeriesCache::new(capacity));
        self
    }

    /// Drop a ticker's cached series, forcing a re-read on next access.
    pub fn invalidate(&self, ticker: &str) -> bool {
        self.series_cache.lock().unwrap().invalidate(ticker)
    }

    /// Drop all cached data, including the standing table.
    pub fn clear_cache(&self) {
        self.series_cache.lock().unwrap().clear();
        *self.standing_cache.lock().unwrap() = None;
    }

    fn price_file(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(format!("{ticker}.csv"))
    }

    fn parse_price_file(&self, ticker: &str, path: &Path) -> Result<Vec<PricePoint>, CoreError> {
        info!(ticker, path = %path.display(), "loading price series");

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let date_col = Self::column_position(&headers, "Date", path)?;
        let close_col = Self::column_position(&headers, "Adj Close", path)?;

        let mut points = Vec::new();
        for record in reader.records() {
            let record = record?;
            let date_field = record.get(date_col).unwrap_or("");
            let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d").map_err(|e| {
                CoreError::Csv(format!("bad date '{date_field}' in {}: {e}", path.display()))
            })?;
            let close_field = record.get(close_col).unwrap_or("");
            let adjusted_close: f64 = close_field.parse().map_err(|e| {
                CoreError::Csv(format!(
                    "bad adjusted close '{close_field}' in {}: {e}",
                    path.display()
                ))
            })?;
            if !adjusted_close.is_finite() || adjusted_close <= 0.0 {
                return Err(CoreError::InvalidPrice {
                    ticker: ticker.to_string(),
                    date,
                    value: adjusted_close,
                });
            }
            points.push(PricePoint {
                date,
                adjusted_close,
            });
        }

        // Files are normally date-ordered already; enforce the contract anyway.
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    fn parse_standing_file(&self) -> Result<Vec<StockStandingData>, CoreError> {
        let path = self.data_dir.join(&self.standing_data_file);
        info!(path = %path.display(), "loading standing data");

        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?.clone();
        let symbol_col = Self::column_position(&headers, "Symbol", &path)?;
        let sector_col = Self::column_position(&headers, "GICS Sector", &path)?;
        let security_col = headers.iter().position(|h| h == "Security");

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(StockStandingData {
                symbol: record.get(symbol_col).unwrap_or("").to_string(),
                security: security_col
                    .and_then(|c| record.get(c))
                    .unwrap_or("")
                    .to_string(),
                sector: record.get(sector_col).unwrap_or("").to_string(),
            });
        }
        Ok(rows)
    }

    fn column_position(
        headers: &csv::StringRecord,
        name: &str,
        path: &Path,
    ) -> Result<usize, CoreError> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            CoreError::Csv(format!("missing '{name}' column in {}", path.display()))
        })
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl StockDataProvider for CsvStockRepository {
    fn name(&self) -> &str {
        "CSV repository"
    }

    async fn price_series(&self, ticker: &str) -> Result<Vec<PricePoint>, CoreError> {
        if let Some(series) = self.series_cache.lock().unwrap().get(ticker) {
            debug!(ticker, "price series cache hit");
            return Ok(series);
        }

        let path = self.price_file(ticker);
        if !path.is_file() {
            return Err(CoreError::UnknownTicker(ticker.to_string()));
        }

        let series = self.parse_price_file(ticker, &path)?;
        self.series_cache
            .lock()
            .unwrap()
            .insert(ticker, series.clone());
        Ok(series)
    }

    async fn standing_data(
        &self,
        tickers: &[String],
    ) -> Result<Vec<StockStandingData>, CoreError> {
        {
            let cached = self.standing_cache.lock().unwrap();
            if let Some(rows) = cached.as_ref() {
                return Ok(rows
                    .iter()
                    .filter(|row| tickers.contains(&row.symbol))
                    .cloned()
                    .collect());
            }
        }

        let rows = self.parse_standing_file()?;
        let filtered = rows
            .iter()
            .filter(|row| tickers.contains(&row.symbol))
            .cloned()
            .collect();
        *self.standing_cache.lock().unwrap() = Some(rows);
        Ok(filtered)
    }

    async fn list_tickers(&self) -> Result<Vec<String>, CoreError> {
        let mut tickers = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if name.eq_ignore_ascii_case(&self.standing_data_file) {
                continue;
            }
            if let Some(stem) = name.strip_suffix(".csv") {
                tickers.push(stem.to_string());
            }
        }
        tickers.sort_unstable();
        Ok(tickers)
    }
}
