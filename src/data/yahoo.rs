//! Yahoo Finance v8 chart API: daily prices and corporate actions.
//!
//! Yahoo has no official API. The chart endpoint returns parallel arrays
//! (`timestamp`, `indicators.quote[0].open`, ...) plus an optional `events`
//! object holding dividends and splits keyed by timestamp.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::provider::DataProvider;
use crate::domain::{ACTION_COLUMNS, DateRange, PRICE_COLUMNS, SeriesRequest, Source, Table};
use crate::error::AppError;

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// `period1` Yahoo accepts as "from the first available bar".
const MAX_HISTORY_PERIOD1: i64 = -2_208_994_789;

pub struct YahooClient {
    client: Client,
}

impl YahooClient {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::provider(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn fetch_chart(&self, request: &SeriesRequest) -> Result<ChartResponse, AppError> {
        let symbol = request.identifier.as_str();
        let (period1, period2) = chart_period(&request.range);
        let url = format!("{BASE_URL}/{}", encode_symbol(symbol));

        let mut query = vec![
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
            ("interval", "1d".to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ];
        if request.source == Source::EquityActions {
            query.push(("events", "div,splits".to_string()));
        }

        tracing::debug!(%url, period1, period2, "Yahoo chart request");
        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .map_err(|e| AppError::provider(format!("Yahoo request failed for {symbol}: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::provider(format!(
                "Yahoo request for {symbol} failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| AppError::provider(format!("Failed to parse Yahoo response for {symbol}: {e}")))
    }
}

impl DataProvider for YahooClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn get(&self, request: &SeriesRequest) -> Result<Table, AppError> {
        let chart = self.fetch_chart(request)?;
        match request.source {
            Source::Equity => price_table(&request.identifier, chart, &request.range),
            Source::EquityActions => actions_table(&request.identifier, chart, &request.range),
            Source::Treasury => Err(AppError::provider(format!(
                "Yahoo cannot serve treasury series ({}).",
                request.identifier
            ))),
        }
    }
}

/// Unix-second bounds for the chart query.
fn chart_period(range: &DateRange) -> (i64, i64) {
    let period1 = range
        .start
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(MAX_HISTORY_PERIOD1);
    let period2 = range
        .end_or_today()
        .and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(i64::MAX);
    (period1, period2)
}

/// Index symbols start with `^`, which must be escaped in the URL path.
fn encode_symbol(symbol: &str) -> String {
    symbol.replace('^', "%5E")
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
    events: Option<Events>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct Events {
    #[serde(default)]
    dividends: HashMap<String, DividendEvent>,
    #[serde(default)]
    splits: HashMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

fn first_result(symbol: &str, resp: ChartResponse) -> Result<ChartData, AppError> {
    let results = match (resp.chart.result, resp.chart.error) {
        (_, Some(err)) => {
            return Err(AppError::provider(format!(
                "Yahoo returned an error for {symbol}: {}: {}",
                err.code, err.description
            )));
        }
        (Some(results), None) => results,
        (None, None) => {
            return Err(AppError::provider(format!(
                "Yahoo returned neither data nor an error for {symbol}."
            )));
        }
    };
    results
        .into_iter()
        .next()
        .ok_or_else(|| AppError::provider(format!("Yahoo returned an empty result for {symbol}.")))
}

/// Exchange-local calendar date of a bar timestamp.
fn bar_date(ts: i64, gmtoffset: i64) -> Result<NaiveDate, AppError> {
    DateTime::from_timestamp(ts + gmtoffset, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| AppError::provider(format!("Invalid Yahoo timestamp: {ts}")))
}

fn price_table(symbol: &str, resp: ChartResponse, range: &DateRange) -> Result<Table, AppError> {
    let data = first_result(symbol, resp)?;
    let mut table = Table::new(PRICE_COLUMNS);

    // Symbols with no trading in the window come back without timestamps.
    let Some(timestamps) = data.timestamp else {
        return Ok(table);
    };
    let indicators = data
        .indicators
        .ok_or_else(|| AppError::provider(format!("Yahoo response for {symbol} has no indicators.")))?;
    let quote = indicators.quote.into_iter().next().unwrap_or_default();
    let adj_close = indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

    for (i, &ts) in timestamps.iter().enumerate() {
        let date = bar_date(ts, data.meta.gmtoffset)?;
        if !range.contains(date) {
            continue;
        }
        let row = vec![
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
            at(&quote.volume, i),
            at(&adj_close, i),
        ];
        table.insert_row(date, row)?;
    }

    Ok(table)
}

fn actions_table(symbol: &str, resp: ChartResponse, range: &DateRange) -> Result<Table, AppError> {
    let data = first_result(symbol, resp)?;
    let mut table = Table::new(ACTION_COLUMNS);
    let events = data.events.unwrap_or_default();
    let offset = data.meta.gmtoffset;

    for dividend in events.dividends.values() {
        let date = bar_date(dividend.date, offset)?;
        if range.contains(date) {
            table.set(date, 0, Some(dividend.amount));
        }
    }
    for split in events.splits.values() {
        let date = bar_date(split.date, offset)?;
        if range.contains(date) && split.denominator != 0.0 {
            table.set(date, 1, Some(split.numerator / split.denominator));
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 2024-01-02 and 2024-01-03 at 14:30 UTC, New York offset -18000.
    const PRICES: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "^GSPC", "gmtoffset": -18000},
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open":   [4745.2, 4725.1, null],
                        "high":   [4754.3, 4729.3, null],
                        "low":    [4722.7, 4699.7, null],
                        "close":  [4742.8, 4704.8, null],
                        "volume": [3743050000, 3950760000, null]
                    }],
                    "adjclose": [{"adjclose": [4742.8, 4704.8, null]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_daily_prices() {
        let resp: ChartResponse = serde_json::from_str(PRICES).unwrap();
        let mut table = price_table("^GSPC", resp, &DateRange::all_history()).unwrap();

        assert_eq!(table.columns(), PRICE_COLUMNS);
        assert_eq!(table.first_date(), Some(d(2024, 1, 2)));
        assert_eq!(table.get(d(2024, 1, 2), "Close"), Some(4742.8));
        assert_eq!(table.get(d(2024, 1, 3), "Volume"), Some(3_950_760_000.0));
        assert_eq!(table.get(d(2024, 1, 3), "Adj Close"), Some(4704.8));

        // The all-null bar is kept by the parser and removed by the builder.
        assert_eq!(table.len(), 3);
        assert_eq!(table.drop_empty_rows(), 1);
    }

    #[test]
    fn bars_outside_range_are_skipped() {
        let resp: ChartResponse = serde_json::from_str(PRICES).unwrap();
        let range = DateRange::new(Some(d(2024, 1, 3)), Some(d(2024, 1, 3))).unwrap();
        let table = price_table("^GSPC", resp, &range).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.first_date(), Some(d(2024, 1, 3)));
    }

    #[test]
    fn parses_dividends_and_splits() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"gmtoffset": -18000},
                    "timestamp": [1704205800],
                    "indicators": {"quote": [{"open": [1.0], "high": [1.0], "low": [1.0], "close": [1.0], "volume": [1]}]},
                    "events": {
                        "dividends": {
                            "1703255400": {"amount": 0.744, "date": 1703255400},
                            "1695303000": {"amount": 0.43, "date": 1695303000}
                        },
                        "splits": {
                            "1703255400": {"date": 1703255400, "numerator": 2, "denominator": 1, "splitRatio": "2:1"}
                        }
                    }
                }],
                "error": null
            }
        }"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        let table = actions_table("XLK", resp, &DateRange::all_history()).unwrap();

        assert_eq!(table.columns(), ACTION_COLUMNS);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(d(2023, 12, 22), "Dividends"), Some(0.744));
        assert_eq!(table.get(d(2023, 12, 22), "Stock Splits"), Some(2.0));
        assert_eq!(table.get(d(2023, 9, 21), "Dividends"), Some(0.43));
        assert_eq!(table.get(d(2023, 9, 21), "Stock Splits"), None);
    }

    #[test]
    fn api_error_maps_to_provider_unavailable() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        let err = price_table("NOPE", resp, &DateRange::all_history()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ProviderUnavailable);
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn open_start_uses_max_history() {
        let (p1, p2) = chart_period(&DateRange::new(None, Some(d(2020, 1, 1))).unwrap());
        assert_eq!(p1, MAX_HISTORY_PERIOD1);
        assert_eq!(p2, 1_577_923_199);

        let (p1, _) = chart_period(&DateRange::new(Some(d(2020, 1, 1)), None).unwrap());
        assert_eq!(p1, 1_577_836_800);
    }

    #[test]
    fn caret_is_escaped() {
        assert_eq!(encode_symbol("^GSPC"), "%5EGSPC");
        assert_eq!(encode_symbol("XLK"), "XLK");
    }

    #[test]
    fn client_builds_with_default_timeout() {
        assert!(YahooClient::new().is_ok());
    }
}
