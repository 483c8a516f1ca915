//! Built-in feature catalogue, one module per family.
//!
//! Each family exposes `units()`; [`all`] concatenates them. Every formula is a
//! plain `fn(&BarTable) -> Vec<f64>` wrapped in a [`FormulaUnit`].

use crate::series;
use crate::unit::FormulaUnit;
use featlab_core::BarTable;

pub mod geometry;
pub mod hybrid;
pub mod information;
pub mod momentum;
pub mod regime;
pub mod trend;
pub mod volatility;
pub mod volume;

/// Every catalogue unit, grouped by family.
pub fn all() -> Vec<FormulaUnit> {
    let mut units = Vec::new();
    units.extend(trend::units());
    units.extend(momentum::units());
    units.extend(volatility::units());
    units.extend(volume::units());
    units.extend(information::units());
    units.extend(geometry::units());
    units.extend(regime::units());
    units.extend(hybrid::units());
    units
}

/// True range per bar; the first bar falls back to its high-low range.
pub(crate) fn true_range(table: &BarTable) -> Vec<f64> {
    let bars = table.bars();
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let prev_close = i.checked_sub(1).map(|p| bars[p].close);
            bar.true_range(prev_close)
        })
        .collect()
}

/// High minus low per bar.
pub(crate) fn ranges(table: &BarTable) -> Vec<f64> {
    table.map(|b| b.range())
}

/// One-bar close change.
pub(crate) fn close_delta(table: &BarTable) -> Vec<f64> {
    series::diff(&table.closes(), 1)
}

/// One-bar close return.
pub(crate) fn close_returns(table: &BarTable) -> Vec<f64> {
    series::pct_change(&table.closes(), 1)
}

/// Three-way direction of the one-bar close change (flat on the first bar).
pub(crate) fn close_direction(table: &BarTable) -> Vec<f64> {
    series::map(&close_delta(table), series::direction)
}

/// Signed volume: positive on up bars, negative on down bars, zero otherwise.
pub(crate) fn signed_volume(table: &BarTable) -> Vec<f64> {
    table.map(|b| {
        if b.close > b.open {
            b.volume
        } else if b.close < b.open {
            -b.volume
        } else {
            0.0
        }
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use featlab_core::{Bar, BarTable};

    /// Deterministic zig-zag walk with occasional jumps.
    ///
    /// The drift keeps every 30-bar mean change positive while single bars
    /// still move both ways.
    pub fn make_table(n: usize) -> BarTable {
        let mut close = 2000.0;
        let bars = (0..n)
            .map(|i| {
                let step = ((i * 37 % 23) as f64 - 11.0) * 0.35 + 0.8;
                let jump = if i % 97 == 50 { close * 0.03 } else { 0.0 };
                let open = close;
                close = (close + step + jump).max(1.0);
                let spread = 1.0 + (i % 5) as f64 * 0.4;
                Bar {
                    ts_ms: 1_704_067_200_000 + i as i64 * 300_000,
                    open,
                    high: open.max(close) + spread,
                    low: open.min(close) - spread * 0.8,
                    close,
                    volume: 50.0 + ((i * 53) % 41) as f64 * 3.0,
                }
            })
            .collect();
        BarTable::new(bars).unwrap()
    }
}
