//! Last-bar perturbation.

use featlab_core::BarTable;
use serde::Serialize;

/// Multiplicative shocks applied to the final bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Perturbation {
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

impl Perturbation {
    /// Close and high up 5%, low down 5%, volume up 50%. Open is untouched.
    pub const STANDARD: Perturbation = Perturbation {
        close: 1.05,
        high: 1.05,
        low: 0.95,
        volume: 1.5,
    };

    /// Deep copy of `table` with the last bar shocked; `None` for an empty table.
    pub fn apply(&self, table: &BarTable) -> Option<BarTable> {
        table.with_last_bar(|bar| {
            bar.close *= self.close;
            bar.high *= self.high;
            bar.low *= self.low;
            bar.volume *= self.volume;
        })
    }
}

impl Default for Perturbation {
    fn default() -> Self {
        Self::STANDARD
    }
}
