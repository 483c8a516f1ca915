//! Header normalization.
//!
//! Field names are resolved case-insensitively exactly once, here, so feature
//! code only ever sees typed [`Bar`](featlab_core::Bar) fields.

use featlab_core::{BarField, Error, Result};

/// Name of the optional timestamp column after normalization.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Trim and lower-case every header.
pub fn normalize_columns<I, S>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    headers
        .into_iter()
        .map(|h| h.as_ref().trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect()
}

/// Column positions of the bar fields inside a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Timestamp column, if the file has one.
    pub timestamp: Option<usize>,
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
    pub volume: usize,
}

impl ColumnLayout {
    /// Locate every field in a list of normalized headers.
    pub fn resolve(normalized: &[String]) -> Result<Self> {
        let find = |name: &str| normalized.iter().position(|h| h == name);
        let require = |field: BarField| {
            find(field.name())
                .ok_or_else(|| Error::data(format!("missing required column: {field}")))
        };

        Ok(Self {
            timestamp: find(TIMESTAMP_COLUMN),
            open: require(BarField::Open)?,
            high: require(BarField::High)?,
            low: require(BarField::Low)?,
            close: require(BarField::Close)?,
            volume: require(BarField::Volume)?,
        })
    }

    /// Position of a field.
    pub fn position(&self, field: BarField) -> usize {
        match field {
            BarField::Open => self.open,
            BarField::High => self.high,
            BarField::Low => self.low,
            BarField::Close => self.close,
            BarField::Volume => self.volume,
        }
    }
}
