//! Output destinations for finished tables.
//!
//! Pipelines hand every artifact to a `TableSink` by file name, so the same
//! pipeline writes to disk in the binary and to memory in tests.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::Table;
use crate::error::AppError;
use crate::io::export::write_csv;

pub trait TableSink {
    /// Store `table` under `name` (a file name such as `treasury_benchmark.csv`),
    /// replacing anything previously stored under that name.
    fn write(&mut self, name: &str, table: &Table) -> Result<(), AppError>;
}

/// Writes each table as `<dir>/<name>`.
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Paths written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl TableSink for DirSink {
    fn write(&mut self, name: &str, table: &Table) -> Result<(), AppError> {
        let path = self.dir.join(name);
        write_csv(table, &path)?;
        tracing::info!(path = %path.display(), rows = table.len(), columns = table.width(), "wrote CSV");
        self.written.push(path);
        Ok(())
    }
}

/// Keeps tables in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: BTreeMap<String, Table>,
    order: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Names in the order they were (last) written.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableSink for MemorySink {
    fn write(&mut self, name: &str, table: &Table) -> Result<(), AppError> {
        self.order.retain(|n| n != name);
        self.order.push(name.to_string());
        self.tables.insert(name.to_string(), table.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn memory_sink_overwrites_by_name() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let mut sink = MemorySink::new();
        sink.write("a.csv", &Table::from_series("A", [(d, Some(1.0))])).unwrap();
        sink.write("b.csv", &Table::from_series("B", [(d, Some(2.0))])).unwrap();
        sink.write("a.csv", &Table::from_series("A", [(d, Some(3.0))])).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.names(), ["b.csv", "a.csv"]);
        assert_eq!(sink.get("a.csv").and_then(|t| t.get(d, "A")), Some(3.0));
    }

    #[test]
    fn dir_sink_writes_under_dir() {
        let dir = tempfile::tempdir().unwrap();
        let d = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let mut sink = DirSink::new(dir.path());
        sink.write("XLK.csv", &Table::from_series("Close", [(d, Some(88.5))])).unwrap();

        let path = dir.path().join("XLK.csv");
        assert_eq!(sink.written(), [path.clone()]);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Date,Close\n2020-01-02,88.5\n");
    }
}
