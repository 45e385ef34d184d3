use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// A single price observation (date → adjusted close).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    /// Closing price adjusted for splits and dividends, the input to all
    /// return computation.
    pub adjusted_close: f64,
}

/// Bounded cache of parsed price series, owned by the data repository.
///
/// Eviction policy: least-recently-used, bounded by `capacity` (default 10
/// series). A `get` counts as a use. Invalidation is explicit: callers
/// drop a ticker with `invalidate` (e.g., after its file changed on disk)
/// or wipe everything with `clear`. The performance engine itself never
/// holds one of these; caching is strictly the collaborator's concern.
#[derive(Debug, Clone)]
pub struct PriceSeriesCache {
    capacity: usize,
    entries: HashMap<String, Vec<PricePoint>>,
    /// Use order: front = least recently used, back = most recently used.
    order: VecDeque<String>,
}

/// Default number of price series kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

impl PriceSeriesCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Get a cached series, marking it as most recently used.
    pub fn get(&mut self, ticker: &str) -> Option<Vec<PricePoint>> {
        if !self.entries.contains_key(ticker) {
            return None;
        }
        self.touch(ticker);
        self.entries.get(ticker).cloned()
    }

    /// Insert or replace a series, evicting the least-recently-used entry
    /// when at capacity.
    pub fn insert(&mut self, ticker: impl Into<String>, series: Vec<PricePoint>) {
        let ticker = ticker.into();
        if self.entries.contains_key(&ticker) {
            self.entries.insert(ticker.clone(), series);
            self.touch(&ticker);
            return;
        }
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.entries.remove(&evicted);
            }
        }
        self.order.push_back(ticker.clone());
        self.entries.insert(ticker, series);
    }

    /// Drop a single ticker's series. Returns true if it was cached.
    pub fn invalidate(&mut self, ticker: &str) -> bool {
        self.order.retain(|t| t != ticker);
        self.entries.remove(ticker).is_some()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn touch(&mut self, ticker: &str) {
        self.order.retain(|t| t != ticker);
        self.order.push_back(ticker.to_string());
    }
}

impl Default for PriceSeriesCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
