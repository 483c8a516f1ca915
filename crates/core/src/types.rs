//! Core data types for the featlab system.

use crate::error::{Error, Result};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

/// Render a timestamp the way reports print it (`2024-01-01 00:05:00`).
///
/// Values outside chrono's range fall back to the raw millisecond count.
pub fn format_timestamp(ts_ms: TimestampMs) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ts_ms) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts_ms.to_string(),
    }
}

/// One OHLCV observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Timestamp in milliseconds.
    pub ts_ms: TimestampMs,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
}

impl Bar {
    /// High minus low.
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Absolute open-to-close distance.
    #[inline]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Distance from the top of the body to the high.
    #[inline]
    pub fn upper_wick(&self) -> f64 {
        self.high - self.close.max(self.open)
    }

    /// Distance from the bottom of the body to the low.
    #[inline]
    pub fn lower_wick(&self) -> f64 {
        self.close.min(self.open) - self.low
    }

    /// True range given the previous close (plain range for the first bar).
    #[inline]
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => self
                .range()
                .max((self.high - pc).abs())
                .max((self.low - pc).abs()),
            None => self.range(),
        }
    }

    /// Hour of day (UTC) of the bar timestamp.
    pub fn hour(&self) -> Option<u32> {
        DateTime::<Utc>::from_timestamp_millis(self.ts_ms).map(|dt| dt.hour())
    }

    /// Value of a single field.
    #[inline]
    pub fn field(&self, field: BarField) -> f64 {
        match field {
            BarField::Open => self.open,
            BarField::High => self.high,
            BarField::Low => self.low,
            BarField::Close => self.close,
            BarField::Volume => self.volume,
        }
    }

    fn validate(&self, row: usize) -> Result<()> {
        for field in [BarField::Open, BarField::High, BarField::Low, BarField::Close] {
            let v = self.field(field);
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::data(format!(
                    "row {row}: {field} must be a positive number, got {v}"
                )));
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(Error::data(format!(
                "row {row}: volume must be non-negative, got {}",
                self.volume
            )));
        }
        Ok(())
    }
}

/// Numeric bar fields, addressed case-insensitively by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl BarField {
    /// All fields in canonical column order.
    pub const ALL: [BarField; 5] = [
        BarField::Open,
        BarField::High,
        BarField::Low,
        BarField::Close,
        BarField::Volume,
    ];

    /// Canonical lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            BarField::Open => "open",
            BarField::High => "high",
            BarField::Low => "low",
            BarField::Close => "close",
            BarField::Volume => "volume",
        }
    }
}

impl fmt::Display for BarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BarField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        BarField::ALL
            .into_iter()
            .find(|f| f.name() == lower)
            .ok_or_else(|| Error::data(format!("unknown bar field: {s}")))
    }
}

/// Time-ordered, validated table of bars.
///
/// Once built the table is never mutated in place; derived tables
/// ([`BarTable::with_last_bar`]) are fresh copies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTable {
    bars: Vec<Bar>,
}

impl BarTable {
    /// Build a table, checking ordering and value invariants.
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        for (i, bar) in bars.iter().enumerate() {
            bar.validate(i)?;
        }
        if let Some(i) = bars.windows(2).position(|w| w[0].ts_ms >= w[1].ts_ms) {
            return Err(Error::data(format!(
                "timestamps must be strictly increasing: row {} ({}) is not after row {} ({})",
                i + 1,
                format_timestamp(bars[i + 1].ts_ms),
                i,
                format_timestamp(bars[i].ts_ms),
            )));
        }
        Ok(Self { bars })
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All bars in time order.
    #[inline]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Bar at a row index.
    #[inline]
    pub fn get(&self, row: usize) -> Option<&Bar> {
        self.bars.get(row)
    }

    /// Last bar, if any.
    #[inline]
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Timestamp of a row.
    #[inline]
    pub fn timestamp(&self, row: usize) -> Option<TimestampMs> {
        self.bars.get(row).map(|b| b.ts_ms)
    }

    /// Timestamps of every row.
    pub fn timestamps(&self) -> Vec<TimestampMs> {
        self.bars.iter().map(|b| b.ts_ms).collect()
    }

    /// Copy of one field as a column.
    pub fn column(&self, field: BarField) -> Vec<f64> {
        self.bars.iter().map(|b| b.field(field)).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.column(BarField::Open)
    }

    pub fn highs(&self) -> Vec<f64> {
        self.column(BarField::High)
    }

    pub fn lows(&self) -> Vec<f64> {
        self.column(BarField::Low)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.column(BarField::Close)
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.column(BarField::Volume)
    }

    /// Map every bar to a value.
    pub fn map<F: Fn(&Bar) -> f64>(&self, f: F) -> Vec<f64> {
        self.bars.iter().map(f).collect()
    }

    /// Copy of the table with the last bar modified by `f`.
    ///
    /// Returns `None` for an empty table. The timestamp of the last bar is
    /// preserved regardless of what `f` does to it.
    pub fn with_last_bar<F: FnOnce(&mut Bar)>(&self, f: F) -> Option<BarTable> {
        let mut bars = self.bars.clone();
        let last = bars.last_mut()?;
        let ts_ms = last.ts_ms;
        f(last);
        last.ts_ms = ts_ms;
        Some(BarTable { bars })
    }
}

/// A feature's output: one value per input row, `NaN` meaning missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureColumn {
    /// Feature code.
    pub name: String,
    /// Row-aligned values.
    pub values: Vec<f64>,
}

impl FeatureColumn {
    /// Create a column.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a row, `None` when missing or out of range.
    #[inline]
    pub fn get(&self, row: usize) -> Option<f64> {
        self.values.get(row).copied().filter(|v| !v.is_nan())
    }

    /// Whether the value at a row is the missing marker.
    #[inline]
    pub fn is_missing(&self, row: usize) -> bool {
        self.values.get(row).map_or(true, |v| v.is_nan())
    }

    /// Number of leading missing values.
    pub fn leading_missing(&self) -> usize {
        self.values.iter().take_while(|v| v.is_nan()).count()
    }

    /// Number of present values.
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }
}
