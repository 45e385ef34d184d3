use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single (date, value) observation in a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A date-indexed table with named columns and optional cells.
///
/// Rows are an ordered calendar of distinct dates; columns are tickers (or
/// sector labels). A `None` cell means "no observation": returns without a
/// price transition, weights without a defined return, and so on. All the
/// matrices in the performance pipeline (returns, weights, contributions,
/// sector aggregates) share this one shape, so alignment is explicit rather
/// than implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateFrame {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    /// Row-major: `cells[row * columns.len() + col]`.
    cells: Vec<Option<f64>>,
}

impl DateFrame {
    /// Create an all-missing frame over the given calendar and columns.
    /// `dates` must be ascending and distinct.
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<String>) -> Self {
        debug_assert!(dates.windows(2).all(|w| w[0] < w[1]));
        let cells = vec![None; dates.len() * columns.len()];
        Self {
            dates,
            columns,
            cells,
        }
    }

    /// Build a frame from per-column series, aligned on the union of all
    /// observed dates. A date present for one column but absent for another
    /// yields a missing cell for the latter.
    pub fn from_series(series: &[(String, Vec<DatePoint>)]) -> Self {
        let mut calendar: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, points)| points.iter().map(|p| p.date))
            .collect();
        calendar.sort_unstable();
        calendar.dedup();

        let columns: Vec<String> = series.iter().map(|(name, _)| name.clone()).collect();
        let mut frame = Self::new(calendar, columns);

        for (col, (_, points)) in series.iter().enumerate() {
            for point in points {
                // Calendar is the union of all series dates, so this always hits.
                if let Ok(row) = frame.dates.binary_search(&point.date) {
                    frame.set(row, col, Some(point.value));
                }
            }
        }

        frame
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells[row * self.columns.len() + col]
    }

    /// Look a cell up by date and column name.
    pub fn get_at(&self, date: NaiveDate, column: &str) -> Option<f64> {
        let row = self.dates.binary_search(&date).ok()?;
        let col = self.column_index(column)?;
        self.get(row, col)
    }

    pub fn set(&mut self, row: usize, col: usize, value: Option<f64>) {
        let width = self.columns.len();
        self.cells[row * width + col] = value;
    }

    /// All cells of one column in calendar order.
    pub fn column(&self, col: usize) -> Vec<Option<f64>> {
        (0..self.dates.len()).map(|row| self.get(row, col)).collect()
    }

    /// Sum of the defined cells in a row; missing cells contribute 0, and a
    /// fully-missing row sums to 0 (matching dataframe row-sum semantics).
    pub fn row_sum(&self, row: usize) -> f64 {
        (0..self.columns.len())
            .filter_map(|col| self.get(row, col))
            .sum()
    }

    /// Number of defined cells in a row.
    pub fn row_defined_count(&self, row: usize) -> usize {
        (0..self.columns.len())
            .filter(|&col| self.get(row, col).is_some())
            .count()
    }

    /// Compound each column into a cumulative-return series:
    /// `cum[t] = Π(1 + cell[0..=t]) − 1` over the defined cells.
    ///
    /// The accumulator carries unchanged across missing cells, so a gap is
    /// treated as flat performance; the output cell stays missing wherever
    /// the input cell is missing.
    pub fn cumulative(&self) -> DateFrame {
        let mut out = DateFrame::new(self.dates.clone(), self.columns.clone());
        for col in 0..self.columns.len() {
            let mut acc = 1.0;
            for row in 0..self.dates.len() {
                if let Some(value) = self.get(row, col) {
                    acc *= 1.0 + value;
                    out.set(row, col, Some(acc - 1.0));
                }
            }
        }
        out
    }

    /// Element-wise product of two frames with identical calendars and
    /// columns. A cell is missing in the output if it is missing in either
    /// input.
    pub fn multiply(&self, other: &DateFrame) -> DateFrame {
        debug_assert_eq!(self.dates, other.dates);
        debug_assert_eq!(self.columns, other.columns);
        let mut out = DateFrame::new(self.dates.clone(), self.columns.clone());
        for row in 0..self.dates.len() {
            for col in 0..self.columns.len() {
                let cell = match (self.get(row, col), other.get(row, col)) {
                    (Some(a), Some(b)) => Some(a * b),
                    _ => None,
                };
                out.set(row, col, cell);
            }
        }
        out
    }

    /// Stack `later` below `self`, aligning columns by name (union, in
    /// first-seen order). Every date of `self` must precede every date of
    /// `later`; used to prepend extended history to an in-range frame.
    pub fn stack(&self, later: &DateFrame) -> DateFrame {
        debug_assert!(match (self.dates.last(), later.dates.first()) {
            (Some(a), Some(b)) => a < b,
            _ => true,
        });

        let mut columns = self.columns.clone();
        for name in &later.columns {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }

        let mut dates = self.dates.clone();
        dates.extend_from_slice(&later.dates);

        let mut out = DateFrame::new(dates, columns);
        for (frame, row_offset) in [(self, 0), (later, self.dates.len())] {
            for (col, name) in frame.columns.iter().enumerate() {
                let out_col = out.column_index(name).unwrap();
                for row in 0..frame.dates.len() {
                    out.set(row_offset + row, out_col, frame.get(row, col));
                }
            }
        }
        out
    }
}
