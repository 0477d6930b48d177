//! Read written CSV artifacts back into tables.
//!
//! This is the inverse of `export::write_csv`: the first column must be `Date`,
//! every other column is numeric, blank fields are absent. Unlike a lenient
//! importer, any malformed row aborts with the offending line number, since
//! these files are produced by this tool and a bad line means corruption.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{PRICE_COLUMNS, PriceBar, Table};
use crate::error::AppError;
use crate::io::export::DATE_COLUMN;

/// Load a dated CSV into a `Table`.
pub fn read_csv(path: &Path) -> Result<Table, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_csv_from(file).map_err(|e| AppError::parse(format!("{}: {e}", path.display())))
}

/// Parse a dated CSV from any reader.
pub fn read_csv_from<R: Read>(reader: R) -> Result<Table, AppError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::parse(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let mut names = headers.iter().map(normalize_header_name);
    match names.next() {
        Some(first) if first.eq_ignore_ascii_case(DATE_COLUMN) => {}
        Some(first) => {
            return Err(AppError::parse(format!(
                "First column must be `{DATE_COLUMN}`, found `{first}`."
            )));
        }
        None => return Err(AppError::parse("CSV has no header row.")),
    }
    let mut table = Table::new(names);

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::parse(format!("CSV parse error at line {line}: {e}")))?;
        let (date, values) = parse_row(&record, table.width()).map_err(|e| AppError::parse(format!("Line {line}: {e}")))?;
        if table.contains_date(date) {
            return Err(AppError::parse(format!("Line {line}: duplicate date {date}")));
        }
        table.insert_row(date, values)?;
    }

    Ok(table)
}

/// Load a per-ticker price history (`Date,Open,High,Low,Close,Volume,Adj Close`).
///
/// Columns are matched by name, so extra columns or a different order are fine.
pub fn read_price_history(path: &Path) -> Result<Vec<PriceBar>, AppError> {
    let table = read_csv(path)?;
    price_bars(&table).map_err(|e| AppError::parse(format!("{}: {e}", path.display())))
}

/// Convert a price table into typed bars, ascending by date.
pub fn price_bars(table: &Table) -> Result<Vec<PriceBar>, AppError> {
    let index: HashMap<&str, usize> = PRICE_COLUMNS
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .map(|i| (*name, i))
                .ok_or_else(|| AppError::parse(format!("Missing required column: `{name}`")))
        })
        .collect::<Result<_, _>>()?;

    let bars = table
        .rows()
        .map(|(date, row)| PriceBar {
            date,
            open: row[index["Open"]],
            high: row[index["High"]],
            low: row[index["Low"]],
            close: row[index["Close"]],
            volume: row[index["Volume"]],
            adj_close: row[index["Adj Close"]],
        })
        .collect();
    Ok(bars)
}

/// Shape of a CSV artifact, for `benchdb inspect`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Present (non-blank) values per column.
    pub present: Vec<usize>,
}

pub fn summarize(table: &Table) -> TableSummary {
    let mut present = vec![0usize; table.width()];
    for (_, row) in table.rows() {
        for (count, value) in present.iter_mut().zip(row) {
            if value.is_some() {
                *count += 1;
            }
        }
    }
    TableSummary {
        rows: table.len(),
        columns: table.columns().to_vec(),
        first_date: table.first_date(),
        last_date: table.last_date(),
        present,
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet tools sometimes save UTF-8 CSVs with a BOM before the first header.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_row(record: &StringRecord, width: usize) -> Result<(NaiveDate, Vec<Option<f64>>), String> {
    if record.len() != width + 1 {
        return Err(format!("expected {} fields, found {}", width + 1, record.len()));
    }
    let raw_date = record.get(0).unwrap_or_default();
    let date = parse_date(raw_date).ok_or_else(|| format!("invalid date '{raw_date}'"))?;

    let values = record
        .iter()
        .skip(1)
        .map(parse_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((date, values))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

fn parse_value(raw: &str) -> Result<Option<f64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(|v| Some(v).filter(|x| x.is_finite()))
        .map_err(|_| format!("invalid number '{raw}'"))
}
