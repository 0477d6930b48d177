//! Date-indexed observation table.
//!
//! A `Table` is the single in-memory shape every stage of the builder works on:
//! provider responses, aligned datasets, derived returns and CSV ingest all
//! produce one. Rows are keyed by date (unique, iterated ascending) and hold one
//! optional value per column. `None` means "absent" (FRED's `.`, Yahoo's `null`,
//! an empty CSV field).

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<Option<f64>>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: BTreeMap::new(),
        }
    }

    /// Build a single-column table from `(date, value)` observations.
    ///
    /// Later observations for the same date overwrite earlier ones.
    pub fn from_series<I>(name: impl Into<String>, observations: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let mut table = Self::new([name.into()]);
        for (date, value) in observations {
            table.set(date, 0, value);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Set one cell, creating the row (all absent) if the date is new.
    ///
    /// Non-finite values are stored as absent.
    ///
    /// # Panics
    ///
    /// Panics if `column` is out of range.
    pub fn set(&mut self, date: NaiveDate, column: usize, value: Option<f64>) {
        assert!(column < self.columns.len(), "column index {column} out of range");
        let width = self.columns.len();
        let row = self.rows.entry(date).or_insert_with(|| vec![None; width]);
        row[column] = value.filter(|v| v.is_finite());
    }

    /// Insert or replace a whole row.
    pub fn insert_row(&mut self, date: NaiveDate, values: Vec<Option<f64>>) -> Result<(), AppError> {
        if values.len() != self.columns.len() {
            return Err(AppError::config(format!(
                "Row for {date} has {} values but the table has {} columns.",
                values.len(),
                self.columns.len()
            )));
        }
        let values = values.into_iter().map(|v| v.filter(|x| x.is_finite())).collect();
        self.rows.insert(date, values);
        Ok(())
    }

    /// Look up one cell by date and column name.
    pub fn get(&self, date: NaiveDate, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows.get(&date).and_then(|row| row[idx])
    }

    /// Rows in ascending date order.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &[Option<f64>])> + '_ {
        self.rows.iter().map(|(date, values)| (*date, values.as_slice()))
    }

    /// All `(date, value)` pairs of one column, ascending by date.
    pub fn column_values(&self, name: &str) -> Option<Vec<(NaiveDate, Option<f64>)>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|(date, row)| (*date, row[idx])).collect())
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.rows.contains_key(&date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next_back().copied()
    }

    /// Replace all column names, keeping order.
    pub fn rename_columns<I, S>(&mut self, names: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != self.columns.len() {
            return Err(AppError::config(format!(
                "Cannot rename {} columns with {} names.",
                self.columns.len(),
                names.len()
            )));
        }
        self.columns = names;
        Ok(())
    }

    /// Remove rows where every column is absent. Returns how many were removed.
    pub fn drop_empty_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, row| row.iter().any(Option::is_some));
        before - self.rows.len()
    }

    /// True when no row has a single present value.
    pub fn is_all_absent(&self) -> bool {
        self.rows.values().all(|row| row.iter().all(Option::is_none))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, day).unwrap()
    }

    #[test]
    fn rows_iterate_in_date_order() {
        let table = Table::from_series("A", [(d(3), Some(3.0)), (d(1), Some(1.0)), (d(2), Some(2.0))]);
        let dates: Vec<_> = table.dates().collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
        assert_eq!(table.first_date(), Some(d(1)));
        assert_eq!(table.last_date(), Some(d(3)));
    }

    #[test]
    fn non_finite_values_become_absent() {
        let mut table = Table::new(["A", "B"]);
        table.set(d(1), 0, Some(f64::NAN));
        table.set(d(1), 1, Some(f64::INFINITY));
        assert!(table.is_all_absent());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn drop_empty_rows_keeps_partially_present_rows() {
        let mut table = Table::new(["A", "B"]);
        table.insert_row(d(1), vec![None, None]).unwrap();
        table.insert_row(d(2), vec![Some(1.0), None]).unwrap();
        table.insert_row(d(3), vec![None, Some(2.0)]).unwrap();

        assert_eq!(table.drop_empty_rows(), 1);
        assert_eq!(table.len(), 2);
        assert!(table.rows().all(|(_, row)| row.iter().any(Option::is_some)));
    }

    #[test]
    fn insert_row_rejects_wrong_width() {
        let mut table = Table::new(["A"]);
        let err = table.insert_row(d(1), vec![Some(1.0), Some(2.0)]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn get_by_column_name() {
        let mut table = Table::new(["Open", "Close"]);
        table.insert_row(d(1), vec![Some(10.0), Some(11.0)]).unwrap();
        assert_eq!(table.get(d(1), "Close"), Some(11.0));
        assert_eq!(table.get(d(1), "Volume"), None);
        assert_eq!(table.get(d(2), "Open"), None);
    }
}
