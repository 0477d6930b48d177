//! Period-over-period percent return.

use crate::domain::{RETURN_COLUMN, Table};
use crate::error::AppError;

/// Replace `column` with its percent change, `(v[t] - v[t-1]) / v[t-1] * 100`.
///
/// The result has a single `Return` column. The first row has no predecessor
/// and is dropped. An absent value yields no return for that date, and the next
/// present value is compared against the last present one before the gap.
/// A zero predecessor yields no return.
pub fn compute_return(table: &Table, column: &str) -> Result<Table, AppError> {
    let values = table
        .column_values(column)
        .ok_or_else(|| AppError::config(format!("Column '{column}' not found.")))?;

    let mut out = Table::new([RETURN_COLUMN]);
    let mut prev: Option<f64> = None;

    for (date, value) in values {
        let Some(curr) = value else {
            continue;
        };
        if let Some(p) = prev.filter(|p| *p != 0.0) {
            out.set(date, 0, Some((curr - p) / p * 100.0));
        }
        prev = Some(curr);
    }

    Ok(out)
}
