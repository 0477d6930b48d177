//! FRED API integration for treasury constant-maturity yields.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::provider::DataProvider;
use crate::domain::{SeriesRequest, Source, Table};
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 100_000;

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| AppError::config("Missing FRED_API_KEY in environment (.env)."))?;
        Ok(Self::new(api_key))
    }

    /// Fetch every observation of one series in ascending date order.
    ///
    /// FRED caps a page at `OBS_LIMIT` rows, so long daily histories are paged
    /// with `offset` until a short page comes back.
    pub fn fetch_series(&self, request: &SeriesRequest) -> Result<Vec<(NaiveDate, Option<f64>)>, AppError> {
        let mut out = Vec::new();
        let mut offset = 0usize;

        loop {
            let page = self.fetch_page(request, offset)?;
            let n = page.observations.len();
            tracing::debug!(series = %request.identifier, offset, rows = n, "FRED page");

            for obs in page.observations {
                let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
                    AppError::provider(format!("Invalid FRED date '{}': {e}", obs.date))
                })?;
                out.push((date, parse_value(&obs.value)));
            }

            if n < OBS_LIMIT {
                break;
            }
            offset += n;
        }

        Ok(out)
    }

    fn fetch_page(&self, request: &SeriesRequest, offset: usize) -> Result<ObservationsResponse, AppError> {
        let series_id = request.identifier.as_str();
        let limit = OBS_LIMIT.to_string();
        let offset = offset.to_string();
        let mut req = self.client.get(BASE_URL).query(&[
            ("series_id", series_id),
            ("api_key", self.api_key.as_str()),
            ("file_type", "json"),
            ("sort_order", "asc"),
            ("limit", limit.as_str()),
            ("offset", offset.as_str()),
        ]);

        if let Some(start) = request.range.start {
            req = req.query(&[("observation_start", start.to_string())]);
        }
        if let Some(end) = request.range.end {
            req = req.query(&[("observation_end", end.to_string())]);
        }

        let resp = req
            .send()
            .map_err(|e| AppError::provider(format!("FRED request failed for {series_id}: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::provider(format!(
                "FRED request for {series_id} failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| AppError::provider(format!("Failed to parse FRED response for {series_id}: {e}")))
    }
}

impl DataProvider for FredClient {
    fn name(&self) -> &str {
        "fred"
    }

    fn get(&self, request: &SeriesRequest) -> Result<Table, AppError> {
        if request.source != Source::Treasury {
            return Err(AppError::provider(format!(
                "FRED cannot serve {} series ({}).",
                request.source.label(),
                request.identifier
            )));
        }
        let obs = self.fetch_series(request)?;
        Ok(Table::from_series(request.identifier.clone(), obs))
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// FRED marks missing observations (holidays, discontinued tenors) with `.`.
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
