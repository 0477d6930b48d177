//! Write tables as canonical dated CSV.
//!
//! Layout: a `Date` column (`YYYY-MM-DD`) followed by the table's columns in
//! order. Absent values are empty fields; numbers use Rust's shortest
//! round-trip formatting, so whole numbers (volumes) print without a fraction.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::Table;
use crate::error::AppError;

pub const DATE_COLUMN: &str = "Date";

/// Write `table` to `path`, replacing any existing file.
///
/// Missing parent directories are created. The write is not atomic.
pub fn write_csv(table: &Table, path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create directory '{}': {e}", parent.display())))?;
    }
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create CSV '{}': {e}", path.display())))?;
    write_csv_to(table, file)
        .map_err(|e| AppError::io(format!("Failed to write CSV '{}': {e}", path.display())))
}

/// Serialize `table` to any writer.
pub fn write_csv_to<W: Write>(table: &Table, writer: W) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);

    let header = std::iter::once(DATE_COLUMN).chain(table.columns().iter().map(String::as_str));
    out.write_record(header)
        .map_err(|e| AppError::io(format!("Failed to write CSV header: {e}")))?;

    for (date, row) in table.rows() {
        let date = date.format("%Y-%m-%d").to_string();
        let fields = std::iter::once(date).chain(row.iter().map(|v| format_value(*v)));
        out.write_record(fields)
            .map_err(|e| AppError::io(format!("Failed to write CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, day).unwrap()
    }

    fn render(table: &Table) -> String {
        let mut buf = Vec::new();
        write_csv_to(table, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn date_first_and_absent_as_empty() {
        let mut t = Table::new(["DGS1MO", "DGS30"]);
        t.insert_row(d(2), vec![Some(1.53), None]).unwrap();
        t.insert_row(d(3), vec![None, Some(2.33)]).unwrap();

        assert_eq!(render(&t), "Date,DGS1MO,DGS30\n2020-01-02,1.53,\n2020-01-03,,2.33\n");
    }

    #[test]
    fn whole_numbers_have_no_fraction() {
        let mut t = Table::new(["Close", "Volume"]);
        t.insert_row(d(2), vec![Some(3257.85), Some(3_458_250_000.0)]).unwrap();
        assert_eq!(render(&t), "Date,Close,Volume\n2020-01-02,3257.85,3458250000\n");
    }

    #[test]
    fn empty_table_writes_header_only() {
        let t = Table::new(["Return"]);
        assert_eq!(render(&t), "Date,Return\n");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        let long = Table::from_series("A", (1..=5).map(|i| (d(i), Some(i as f64))));
        write_csv(&long, &path).unwrap();
        let short = Table::from_series("A", [(d(9), Some(9.0))]);
        write_csv(&short, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Date,A\n2020-01-09,9\n");
    }
}
