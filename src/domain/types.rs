//! Shared domain types.
//!
//! These types describe *what* to fetch and *where* to put it. They are built
//! once per run (usually from CLI arguments) and never mutated afterwards.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::error::AppError;

/// FRED constant-maturity treasury series, short to long.
pub const TREASURY_MATURITIES: [&str; 11] = [
    "DGS1MO", "DGS3MO", "DGS6MO", "DGS1", "DGS2", "DGS3", "DGS5", "DGS7", "DGS10", "DGS20", "DGS30",
];

/// Equity index used for the return benchmark.
pub const EQUITY_INDEX: &str = "^GSPC";

/// S&P 500 plus the SPDR sector ETFs.
pub const SECTOR_ETFS: [&str; 10] = ["^GSPC", "XLY", "XLP", "XLE", "XLF", "XLV", "XLI", "XLB", "XLK", "XLU"];

/// Column names of a per-ticker price history.
pub const PRICE_COLUMNS: [&str; 6] = ["Open", "High", "Low", "Close", "Volume", "Adj Close"];

/// Column names of a per-ticker corporate-actions table.
pub const ACTION_COLUMNS: [&str; 2] = ["Dividends", "Stock Splits"];

pub const CLOSE_COLUMN: &str = "Close";
pub const ADJ_CLOSE_COLUMN: &str = "Adj Close";
pub const RETURN_COLUMN: &str = "Return";

pub const TREASURY_FILE: &str = "treasury_benchmark.csv";
pub const EQUITY_FILE: &str = "equity_benchmark.csv";
pub const ADJ_CLOSE_FILE: &str = "AdjClose.csv";

/// Which kind of upstream feed a series comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Macroeconomic series keyed by series code (FRED).
    Treasury,
    /// Daily market prices keyed by ticker.
    Equity,
    /// Dividends and splits keyed by ticker.
    EquityActions,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Source::Treasury => "treasury",
            Source::Equity => "equity",
            Source::EquityActions => "equity-actions",
        }
    }
}

/// Inclusive date range. `start = None` means all available history,
/// `end = None` means today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, AppError> {
        let range = Self { start, end };
        if let Some(s) = start {
            let e = range.end_or_today();
            if s > e {
                return Err(AppError::config(format!("Start date {s} is after end date {e}.")));
            }
        }
        Ok(range)
    }

    /// Everything the provider has, up to today.
    pub fn all_history() -> Self {
        Self::default()
    }

    /// End bound with `None` resolved to the local calendar date.
    pub fn end_or_today(&self) -> NaiveDate {
        self.end.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.start {
            Some(s) => write!(f, "{s}")?,
            None => write!(f, "(all history)")?,
        }
        match self.end {
            Some(e) => write!(f, "..{e}"),
            None => write!(f, "..today"),
        }
    }
}

/// One provider request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub identifier: String,
    pub source: Source,
    pub range: DateRange,
}

impl SeriesRequest {
    pub fn new(identifier: impl Into<String>, source: Source, range: DateRange) -> Self {
        Self {
            identifier: identifier.into(),
            source,
            range,
        }
    }
}

/// Resolved run parameters for all pipelines.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub out_dir: PathBuf,
    pub range: DateRange,
    pub maturities: Vec<String>,
    pub equity_index: String,
    pub etf_tickers: Vec<String>,
    pub action_tickers: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            range: DateRange::all_history(),
            maturities: TREASURY_MATURITIES.iter().map(|s| s.to_string()).collect(),
            equity_index: EQUITY_INDEX.to_string(),
            etf_tickers: SECTOR_ETFS.iter().map(|s| s.to_string()).collect(),
            action_tickers: SECTOR_ETFS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// File name of a per-ticker price history.
pub fn ticker_file(ticker: &str) -> String {
    format!("{ticker}.csv")
}

/// File name of a per-ticker corporate-actions table.
pub fn actions_file(ticker: &str) -> String {
    format!("{ticker}_actions.csv")
}

/// One row of a per-ticker price history file.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub adj_close: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = DateRange::new(Some(d(2021, 1, 1)), Some(d(2020, 1, 1))).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn future_start_without_end_is_rejected() {
        let err = DateRange::new(Some(d(2100, 1, 1)), None).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);

        let today = Local::now().date_naive();
        assert!(DateRange::new(Some(today), None).is_ok());
        assert!(DateRange::new(None, None).is_ok());
    }

    #[test]
    fn open_bounds_contain_everything() {
        let range = DateRange::all_history();
        assert!(range.contains(d(1900, 1, 2)));
        assert!(range.contains(d(2100, 1, 1)));

        let bounded = DateRange::new(Some(d(2020, 1, 1)), Some(d(2020, 12, 31))).unwrap();
        assert!(bounded.contains(d(2020, 1, 1)));
        assert!(bounded.contains(d(2020, 12, 31)));
        assert!(!bounded.contains(d(2021, 1, 1)));
    }

    #[test]
    fn display_marks_open_bounds() {
        assert_eq!(DateRange::all_history().to_string(), "(all history)..today");
        let r = DateRange::new(Some(d(2020, 1, 1)), Some(d(2020, 2, 1))).unwrap();
        assert_eq!(r.to_string(), "2020-01-01..2020-02-01");
    }

    #[test]
    fn default_config_matches_benchmark_files() {
        let config = RunConfig::default();
        assert_eq!(config.maturities.len(), 11);
        assert_eq!(config.maturities.first().map(String::as_str), Some("DGS1MO"));
        assert_eq!(config.equity_index, "^GSPC");
        assert_eq!(config.etf_tickers.len(), 10);
        assert_eq!(ticker_file("XLK"), "XLK.csv");
        assert_eq!(actions_file("XLK"), "XLK_actions.csv");
    }
}
