//! The feature unit interface.

use featlab_core::{BarTable, Error, FeatureColumn, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pure transform from a bar table to one aligned feature column.
///
/// Implementations must be causal: the value at row `i` may only depend on
/// rows `0..=i`. The look-ahead auditor verifies this empirically.
pub trait FeatureUnit: Send + Sync {
    /// Stable identifier, e.g. `vol_vol_of_vol_50`.
    fn code(&self) -> &str;

    /// Number of leading rows that may legitimately be missing.
    fn warmup(&self) -> usize;

    /// Compute the column. Output length must equal `table.len()`.
    fn compute(&self, table: &BarTable) -> Result<FeatureColumn>;

    /// Catalogue family, if the unit belongs to one.
    fn family(&self) -> Option<Family> {
        None
    }

    /// One-line description.
    fn summary(&self) -> &str {
        ""
    }
}

/// Catalogue families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Trend,
    Momentum,
    Volatility,
    Volume,
    Information,
    Geometry,
    Regime,
    Hybrid,
}

impl Family {
    pub fn name(self) -> &'static str {
        match self {
            Family::Trend => "trend",
            Family::Momentum => "momentum",
            Family::Volatility => "volatility",
            Family::Volume => "volume",
            Family::Information => "information",
            Family::Geometry => "geometry",
            Family::Regime => "regime",
            Family::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signature of a catalogue formula.
pub type FormulaFn = fn(&BarTable) -> Vec<f64>;

/// A catalogue unit backed by a plain function.
#[derive(Clone)]
pub struct FormulaUnit {
    code: &'static str,
    family: Family,
    warmup: usize,
    summary: &'static str,
    formula: FormulaFn,
}

impl FormulaUnit {
    pub const fn new(
        code: &'static str,
        family: Family,
        warmup: usize,
        summary: &'static str,
        formula: FormulaFn,
    ) -> Self {
        Self {
            code,
            family,
            warmup,
            summary,
            formula,
        }
    }
}

impl fmt::Debug for FormulaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulaUnit")
            .field("code", &self.code)
            .field("family", &self.family)
            .field("warmup", &self.warmup)
            .finish()
    }
}

impl FeatureUnit for FormulaUnit {
    fn code(&self) -> &str {
        self.code
    }

    fn warmup(&self) -> usize {
        self.warmup
    }

    fn compute(&self, table: &BarTable) -> Result<FeatureColumn> {
        if table.is_empty() {
            return Err(Error::insufficient_data(1, 0));
        }

        let values = (self.formula)(table);
        if values.len() != table.len() {
            return Err(Error::feature(format!(
                "{} produced {} values for {} rows",
                self.code,
                values.len(),
                table.len()
            )));
        }

        Ok(FeatureColumn::new(self.code, values))
    }

    fn family(&self) -> Option<Family> {
        Some(self.family)
    }

    fn summary(&self) -> &str {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featlab_core::Bar;

    fn make_table(n: usize) -> BarTable {
        let bars = (0..n)
            .map(|i| Bar {
                ts_ms: i as i64 * 300_000,
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0 + i as f64 * 0.1,
                volume: 10.0,
            })
            .collect();
        BarTable::new(bars).unwrap()
    }

    fn closes(table: &BarTable) -> Vec<f64> {
        table.closes()
    }

    fn truncated(table: &BarTable) -> Vec<f64> {
        let mut v = table.closes();
        v.pop();
        v
    }

    #[test]
    fn test_formula_unit_compute() {
        let unit = FormulaUnit::new("close_copy", Family::Trend, 0, "close", closes);
        let col = unit.compute(&make_table(5)).unwrap();
        assert_eq!(col.name, "close_copy");
        assert_eq!(col.len(), 5);
        assert_eq!(unit.family(), Some(Family::Trend));
    }

    #[test]
    fn test_empty_table_rejected() {
        let unit = FormulaUnit::new("close_copy", Family::Trend, 0, "close", closes);
        let err = unit.compute(&make_table(0)).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { available: 0, .. }));
    }

    #[test]
    fn test_misaligned_output_rejected() {
        let unit = FormulaUnit::new("short", Family::Trend, 0, "drops a row", truncated);
        let err = unit.compute(&make_table(4)).unwrap_err();
        assert!(matches!(err, Error::Feature(_)));
        assert!(err.to_string().contains("3 values for 4 rows"));
    }
}
