//! Fetch + align: turn several provider answers into one aligned dataset.

use std::collections::HashSet;

use crate::data::DataProvider;
use crate::domain::{DateRange, SeriesRequest, Source, Table};
use crate::error::AppError;

/// Fetch `identifiers` one after another and outer-join them on date.
///
/// Column naming:
/// - a single-column answer is named after its identifier
/// - a multi-column answer for a lone identifier keeps the provider's columns
/// - multi-column answers for several identifiers become `"<identifier> <column>"`
///
/// Rows where every column is absent are removed. If nothing remains the call
/// fails with `ErrorKind::EmptyResult`; provider failures propagate unchanged.
pub fn fetch_series<S: AsRef<str>>(
    provider: &dyn DataProvider,
    identifiers: &[S],
    source: Source,
    range: DateRange,
) -> Result<Table, AppError> {
    if identifiers.is_empty() {
        return Err(AppError::config(format!(
            "No {} identifiers requested.",
            source.label()
        )));
    }

    let lone = identifiers.len() == 1;
    let mut parts = Vec::with_capacity(identifiers.len());

    for id in identifiers {
        let id = id.as_ref();
        let request = SeriesRequest::new(id, source, range);
        tracing::info!(identifier = id, source = source.label(), %range, "fetching series");

        let mut table = provider.get(&request)?;
        tracing::debug!(identifier = id, rows = table.len(), "provider answered");

        if table.width() == 1 {
            table.rename_columns([id])?;
        } else if !lone {
            let prefixed: Vec<String> = table.columns().iter().map(|c| format!("{id} {c}")).collect();
            table.rename_columns(prefixed)?;
        }
        parts.push(table);
    }

    let mut aligned = outer_join(&parts)?;
    let dropped = aligned.drop_empty_rows();
    if dropped > 0 {
        tracing::debug!(dropped, "removed rows with no data in any column");
    }

    if aligned.is_empty() {
        let names: Vec<&str> = identifiers.iter().map(AsRef::as_ref).collect();
        return Err(AppError::empty_result(format!(
            "No data for {} over {range}.",
            names.join(", ")
        )));
    }

    Ok(aligned)
}

/// Outer join on date. Columns keep the order of `tables`; a date missing from
/// one input is absent in that input's columns.
pub fn outer_join(tables: &[Table]) -> Result<Table, AppError> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for table in tables {
        for column in table.columns() {
            if !seen.insert(column.as_str()) {
                return Err(AppError::config(format!("Duplicate column '{column}' in join.")));
            }
            columns.push(column.clone());
        }
    }

    let mut joined = Table::new(columns);
    let mut offset = 0;
    for table in tables {
        for (date, row) in table.rows() {
            for (i, value) in row.iter().enumerate() {
                joined.set(date, offset + i, *value);
            }
        }
        offset += table.width();
    }

    Ok(joined)
}

/// Copy one column into a new single-column table under `rename`.
pub fn select_column(table: &Table, column: &str, rename: &str) -> Result<Table, AppError> {
    let values = table
        .column_values(column)
        .ok_or_else(|| AppError::config(format!("Column '{column}' not found.")))?;
    Ok(Table::from_series(rename, values))
}
