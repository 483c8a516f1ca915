//! Fixture feature units with known causal behaviour.
//!
//! Each fixture exercises one branch of the auditor: clean, leaking, failing,
//! panicking, slow, partially missing, or shifted by a fixed amount.

use featlab_core::{BarField, BarTable, Error, FeatureColumn, Result};
use featlab_features::FeatureUnit;
use std::time::Duration;

/// Close price as-is. Causal.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityUnit;

impl FeatureUnit for IdentityUnit {
    fn code(&self) -> &str {
        "fixture_identity"
    }

    fn warmup(&self) -> usize {
        0
    }

    fn compute(&self, table: &BarTable) -> Result<FeatureColumn> {
        Ok(FeatureColumn::new(self.code(), table.closes()))
    }
}

/// Next bar's close: row `i` reads row `i + 1`. The last row is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuturePeekUnit;

impl FeatureUnit for FuturePeekUnit {
    fn code(&self) -> &str {
        "fixture_future_peek"
    }

    fn warmup(&self) -> usize {
        0
    }

    fn compute(&self, table: &BarTable) -> Result<FeatureColumn> {
        let close = table.closes();
        let values = (0..close.len())
            .map(|i| close.get(i + 1).copied().unwrap_or(f64::NAN))
            .collect();
        Ok(FeatureColumn::new(self.code(), values))
    }
}

/// Next bar's value of a single field, e.g. volume only. The last row is
/// missing.
#[derive(Debug, Clone, Copy)]
pub struct FutureFieldPeekUnit {
    pub field: BarField,
}

impl FeatureUnit for FutureFieldPeekUnit {
    fn code(&self) -> &str {
        "fixture_future_field"
    }

    fn warmup(&self) -> usize {
        0
    }

    fn compute(&self, table: &BarTable) -> Result<FeatureColumn> {
        let column = table.column(self.field);
        let values = (0..column.len())
            .map(|i| column.get(i + 1).copied().unwrap_or(f64::NAN))
            .collect();
        Ok(FeatureColumn::new(self.code(), values))
    }
}

/// Always returns a feature error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingUnit;

pub const FAILING_MESSAGE: &str = "fixture failure: division table exhausted";

impl FeatureUnit for FailingUnit {
    fn code(&self) -> &str {
        "fixture_failing"
    }

    fn warmup(&self) -> usize {
        0
    }

    fn compute(&self, _table: &BarTable) -> Result<FeatureColumn> {
        Err(Error::feature(FAILING_MESSAGE))
    }
}

/// Panics on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingUnit;

pub const PANIC_MESSAGE: &str = "fixture panic: index out of bounds";

impl FeatureUnit for PanickingUnit {
    fn code(&self) -> &str {
        "fixture_panicking"
    }

    fn warmup(&self) -> usize {
        0
    }

    fn compute(&self, _table: &BarTable) -> Result<FeatureColumn> {
        panic!("{}", PANIC_MESSAGE)
    }
}

/// Sleeps before returning the close.
#[derive(Debug, Clone, Copy)]
pub struct SleepingUnit {
    pub delay: Duration,
}

impl SleepingUnit {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }
}

impl FeatureUnit for SleepingUnit {
    fn code(&self) -> &str {
        "fixture_sleeping"
    }

    fn warmup(&self) -> usize {
        0
    }

    fn compute(&self, table: &BarTable) -> Result<FeatureColumn> {
        std::thread::sleep(self.delay);
        Ok(FeatureColumn::new(self.code(), table.closes()))
    }
}

/// Close with the first `warmup` rows missing, in every table alike.
#[derive(Debug, Clone, Copy)]
pub struct WarmupUnit {
    pub warmup: usize,
}

impl FeatureUnit for WarmupUnit {
    fn code(&self) -> &str {
        "fixture_warmup"
    }

    fn warmup(&self) -> usize {
        self.warmup
    }

    fn compute(&self, table: &BarTable) -> Result<FeatureColumn> {
        let values = table
            .closes()
            .into_iter()
            .enumerate()
            .map(|(i, c)| if i < self.warmup { f64::NAN } else { c })
            .collect();
        Ok(FeatureColumn::new(self.code(), values))
    }
}

/// Close, shifted by `offset` whenever the last bar differs from the one
/// the unit was calibrated on.
///
/// With `row = Some(r)` only row `r` is shifted; otherwise every row is.
#[derive(Debug, Clone, Copy)]
pub struct OffsetUnit {
    pub offset: f64,
    pub row: Option<usize>,
    reference_close: f64,
}

impl OffsetUnit {
    /// Calibrate on `table`: computing on `table` itself returns plain closes.
    pub fn for_table(table: &BarTable, offset: f64, row: Option<usize>) -> Self {
        Self {
            offset,
            row,
            reference_close: table.last().map_or(f64::NAN, |b| b.close),
        }
    }
}

impl FeatureUnit for OffsetUnit {
    fn code(&self) -> &str {
        "fixture_offset"
    }

    fn warmup(&self) -> usize {
        0
    }

    fn compute(&self, table: &BarTable) -> Result<FeatureColumn> {
        let shifted = table
            .last()
            .is_some_and(|b| b.close != self.reference_close);
        let values = table
            .closes()
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let hit = self.row.map_or(true, |r| r == i);
                if shifted && hit {
                    c + self.offset
                } else {
                    c
                }
            })
            .collect();
        Ok(FeatureColumn::new(self.code(), values))
    }
}

/// Returns one row fewer than the table holds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortUnit;

impl FeatureUnit for ShortUnit {
    fn code(&self) -> &str {
        "fixture_short"
    }

    fn warmup(&self) -> usize {
        0
    }

    fn compute(&self, table: &BarTable) -> Result<FeatureColumn> {
        let mut values = table.closes();
        values.pop();
        Ok(FeatureColumn::new(self.code(), values))
    }
}
