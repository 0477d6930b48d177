//! Provider abstraction.
//!
//! Pipelines only see `&dyn DataProvider`; the concrete FRED/Yahoo clients live
//! behind a `SourceRouter`, and tests substitute an in-memory provider.

use std::collections::HashMap;

use crate::domain::{SeriesRequest, Source, Table};
use crate::error::AppError;

/// Something that can answer a `SeriesRequest` with a date-indexed table.
pub trait DataProvider {
    /// Human-readable name, used in logs and error messages.
    fn name(&self) -> &str;

    /// Fetch one identifier over the request's date range.
    ///
    /// Network and API failures map to `ErrorKind::ProviderUnavailable`.
    /// An empty table is a valid answer; the caller decides whether that is fatal.
    fn get(&self, request: &SeriesRequest) -> Result<Table, AppError>;
}

/// Dispatches requests to the provider registered for their `Source`.
#[derive(Default)]
pub struct SourceRouter {
    providers: HashMap<Source, Box<dyn DataProvider>>,
}

impl SourceRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` for `source`, replacing any previous one.
    pub fn with(mut self, source: Source, provider: Box<dyn DataProvider>) -> Self {
        self.providers.insert(source, provider);
        self
    }

    pub fn supports(&self, source: Source) -> bool {
        self.providers.contains_key(&source)
    }
}

impl DataProvider for SourceRouter {
    fn name(&self) -> &str {
        "router"
    }

    fn get(&self, request: &SeriesRequest) -> Result<Table, AppError> {
        let provider = self.providers.get(&request.source).ok_or_else(|| {
            AppError::provider(format!(
                "No data provider configured for {} series ({}).",
                request.source.label(),
                request.identifier
            ))
        })?;
        tracing::debug!(provider = provider.name(), identifier = %request.identifier, "routing request");
        provider.get(request)
    }
}
