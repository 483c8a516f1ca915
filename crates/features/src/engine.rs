//! Feature computation engine.
//!
//! Runs a set of units over one bar table and collects the columns into a
//! row-aligned matrix that can be written out as CSV.

use crate::registry::FeatureRegistry;
use crate::unit::FeatureUnit;
use featlab_core::{format_timestamp, BarTable, Error, FeatureColumn, Result, TimestampMs};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Timestamps plus one column per unit, all of the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    timestamps: Vec<TimestampMs>,
    columns: Vec<FeatureColumn>,
}

impl FeatureMatrix {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.timestamps.len()
    }

    pub fn timestamps(&self) -> &[TimestampMs] {
        &self.timestamps
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    /// Column by feature code.
    pub fn column(&self, code: &str) -> Option<&FeatureColumn> {
        self.columns.iter().find(|c| c.name == code)
    }

    /// Write the matrix as CSV: a `timestamp` column followed by one column
    /// per feature. Missing values are written as empty fields.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);

        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push("timestamp".to_string());
        header.extend(self.columns.iter().map(|c| c.name.clone()));
        out.write_record(&header)?;

        for (row, &ts) in self.timestamps.iter().enumerate() {
            let mut record = Vec::with_capacity(header.len());
            record.push(format_timestamp(ts));
            for column in &self.columns {
                record.push(match column.get(row) {
                    Some(v) => v.to_string(),
                    None => String::new(),
                });
            }
            out.write_record(&record)?;
        }

        out.flush()?;
        Ok(())
    }

    /// Write the matrix to a CSV file, replacing it if present.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_csv(std::io::BufWriter::new(file))?;
        info!(
            path = %path.as_ref().display(),
            rows = self.rows(),
            columns = self.columns.len(),
            "Wrote feature matrix"
        );
        Ok(())
    }
}

/// Computes a fixed set of units over bar tables.
pub struct FeatureEngine {
    units: Vec<Arc<dyn FeatureUnit>>,
}

impl FeatureEngine {
    /// Engine over an explicit list of units, computed in list order.
    pub fn new(units: Vec<Arc<dyn FeatureUnit>>) -> Self {
        Self { units }
    }

    /// Engine over every unit in a registry, in code order.
    pub fn from_registry(registry: &FeatureRegistry) -> Self {
        Self::new(registry.iter().cloned().collect())
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Compute every unit. The first failing unit aborts the computation.
    pub fn compute(&self, table: &BarTable) -> Result<FeatureMatrix> {
        let mut columns = Vec::with_capacity(self.units.len());
        for unit in &self.units {
            let column = unit.compute(table).map_err(|e| match e {
                Error::Feature(_) => e,
                other => Error::feature(format!("{}: {other}", unit.code())),
            })?;
            debug!(code = unit.code(), present = column.present_count(), "Computed feature");
            columns.push(column);
        }

        Ok(FeatureMatrix {
            timestamps: table.timestamps(),
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Family, FormulaUnit};
    use featlab_core::Bar;

    fn make_table(n: usize) -> BarTable {
        let bars = (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                Bar {
                    ts_ms: 1_704_067_200_000 + i as i64 * 60_000,
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10.0,
                }
            })
            .collect();
        BarTable::new(bars).unwrap()
    }

    fn previous_close(table: &BarTable) -> Vec<f64> {
        crate::series::shift(&table.closes(), 1)
    }

    fn engine() -> FeatureEngine {
        FeatureEngine::new(vec![
            Arc::new(FormulaUnit::new("prev_close", Family::Trend, 1, "", previous_close)),
            Arc::new(FormulaUnit::new("close", Family::Trend, 0, "", |t| t.closes())),
        ])
    }

    #[test]
    fn test_compute_matrix() {
        let matrix = engine().compute(&make_table(3)).unwrap();
        assert_eq!(matrix.rows(), 3);
        assert_eq!(matrix.columns().len(), 2);
        assert!(matrix.column("prev_close").unwrap().is_missing(0));
        assert_eq!(matrix.column("close").unwrap().get(2), Some(102.0));
    }

    #[test]
    fn test_write_csv() {
        let matrix = engine().compute(&make_table(2)).unwrap();
        let mut buf = Vec::new();
        matrix.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,prev_close,close");
        assert_eq!(lines[1], "2024-01-01 00:00:00,,100");
        assert_eq!(lines[2], "2024-01-01 00:01:00,100,101");
    }

    #[test]
    fn test_save_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        let matrix = engine().compute(&make_table(4)).unwrap();
        matrix.save_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_empty_table_is_error() {
        let empty = BarTable::new(Vec::new()).unwrap();
        let err = engine().compute(&empty).unwrap_err();
        assert!(err.to_string().contains("prev_close"));
    }

    #[test]
    fn test_builtin_engine() {
        let engine = FeatureEngine::from_registry(&FeatureRegistry::builtin());
        let matrix = engine.compute(&make_table(120)).unwrap();
        assert_eq!(matrix.columns().len(), engine.len());
        assert!(matrix.columns().iter().all(|c| c.len() == 120));
    }
}
