//! Reference dataset loader.
//!
//! Reads a delimited OHLCV file into a validated [`BarTable`]. Only the first
//! `row_limit` data rows are parsed; the rest of the file is never touched.

use crate::normalize::{normalize_columns, ColumnLayout};
use crate::timestamp::parse_timestamp;
use csv::{ReaderBuilder, StringRecord, Trim};
use featlab_core::config::{DataConfig, DEFAULT_ROW_LIMIT};
use featlab_core::{Bar, BarField, BarTable, Error, Result};
use std::path::Path;
use tracing::{debug, info};

/// Options for reading a reference file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Rows kept from the start of the file.
    pub row_limit: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

impl LoadOptions {
    /// Options taken from the data section of a configuration.
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            // Config::validate guarantees an ASCII delimiter.
            delimiter: u8::try_from(config.delimiter).unwrap_or(b','),
            row_limit: config.row_limit,
        }
    }
}

/// Load the first `row_limit` rows of a comma-separated reference file.
pub fn load_reference_data(path: impl AsRef<Path>, row_limit: usize) -> Result<BarTable> {
    load_with_options(
        path,
        LoadOptions {
            row_limit,
            ..LoadOptions::default()
        },
    )
}

/// Load a reference file with explicit options.
pub fn load_with_options(path: impl AsRef<Path>, options: LoadOptions) -> Result<BarTable> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::DataUnavailable(path.to_path_buf()));
    }
    if options.row_limit == 0 {
        return Err(Error::config("row_limit must be greater than zero"));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(Trim::All)
        .from_path(path)?;

    let headers = normalize_columns(reader.headers()?.iter());
    let layout = ColumnLayout::resolve(&headers)?;
    debug!(?layout, path = %path.display(), "Resolved reference columns");

    let mut bars = Vec::with_capacity(options.row_limit.min(16_384));
    let mut record = StringRecord::new();
    while bars.len() < options.row_limit && reader.read_record(&mut record)? {
        let row = bars.len();
        bars.push(parse_row(&record, &layout, row)?);
    }

    if bars.is_empty() {
        return Err(Error::data(format!("{} has no data rows", path.display())));
    }

    let table = BarTable::new(bars)?;
    info!(
        rows = table.len(),
        path = %path.display(),
        "Loaded reference data"
    );
    Ok(table)
}

fn parse_row(record: &StringRecord, layout: &ColumnLayout, row: usize) -> Result<Bar> {
    let number = |field: BarField| -> Result<f64> {
        let raw = record.get(layout.position(field)).unwrap_or("");
        raw.parse::<f64>().map_err(|_| {
            Error::data(format!("row {row}: cannot parse {field} value {raw:?}"))
        })
    };

    let ts_ms = match layout.timestamp {
        Some(col) => parse_timestamp(record.get(col).unwrap_or(""))
            .map_err(|e| Error::data(format!("row {row}: {e}")))?,
        None => row as i64,
    };

    Ok(Bar {
        ts_ms,
        open: number(BarField::Open)?,
        high: number(BarField::High)?,
        low: number(BarField::Low)?,
        close: number(BarField::Close)?,
        volume: number(BarField::Volume)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn sample_rows(n: usize) -> String {
        let mut s = String::from("Timestamp,Open,High,Low,Close,Volume\n");
        for i in 0..n {
            let price = 2000.0 + i as f64;
            s.push_str(&format!(
                "2024-01-01 {:02}:{:02}:00,{},{},{},{},{}\n",
                (i * 5) / 60,
                (i * 5) % 60,
                price,
                price + 2.0,
                price - 2.0,
                price + 1.0,
                10.0 + i as f64
            ));
        }
        s
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let err = load_reference_data("/no/such/eth_5m_test.csv", 1000).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn test_load_mixed_case_headers() {
        let file = write_csv(&sample_rows(5));
        let table = load_reference_data(file.path(), 1000).unwrap();
        assert_eq!(table.len(), 5);
        assert!((table.bars()[0].close - 2001.0).abs() < 1e-10);
        assert_eq!(table.timestamp(1).unwrap() - table.timestamp(0).unwrap(), 300_000);
    }

    #[test]
    fn test_row_limit_truncates() {
        let file = write_csv(&sample_rows(30));
        let table = load_reference_data(file.path(), 12).unwrap();
        assert_eq!(table.len(), 12);
        assert!((table.last().unwrap().open - 2011.0).abs() < 1e-10);
    }

    #[test]
    fn test_rows_past_limit_are_not_parsed() {
        let mut contents = sample_rows(3);
        contents.push_str("garbage,x,y,z,w,v\n");
        let file = write_csv(&contents);
        assert_eq!(load_reference_data(file.path(), 3).unwrap().len(), 3);
        assert!(load_reference_data(file.path(), 10).is_err());
    }

    #[test]
    fn test_extreme_epoch_cell_is_data_error() {
        let file = write_csv("timestamp,open,high,low,close,volume\n-9223372036854775808,10,11,9,10.5,1\n");
        let err = load_reference_data(file.path(), 1000).unwrap_err();
        assert!(matches!(err, Error::Data(_)), "{err}");
    }

    #[test]
    fn test_no_timestamp_column_uses_ordinals() {
        let file = write_csv("open,high,low,close,volume\n10,11,9,10.5,1\n10.5,12,10,11,2\n");
        let table = load_reference_data(file.path(), 1000).unwrap();
        assert_eq!(table.timestamps(), vec![0, 1]);
    }

    #[test]
    fn test_custom_delimiter() {
        let file = write_csv("timestamp;open;high;low;close;volume\n1704067200;10;11;9;10.5;1\n");
        let options = LoadOptions {
            delimiter: b';',
            row_limit: 10,
        };
        let table = load_with_options(file.path(), options).unwrap();
        assert_eq!(table.timestamp(0), Some(1704067200000));
    }

    #[test]
    fn test_header_only_is_data_error() {
        let file = write_csv("timestamp,open,high,low,close,volume\n");
        let err = load_reference_data(file.path(), 1000).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
    }

    #[test]
    fn test_bad_number_names_row_and_field() {
        let file = write_csv("timestamp,open,high,low,close,volume\n2024-01-01,10,11,9,abc,1\n");
        let err = load_reference_data(file.path(), 1000).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("row 0"));
        assert!(msg.contains("close"));
    }

    #[test]
    fn test_missing_column() {
        let file = write_csv("timestamp,open,high,low,close\n2024-01-01,10,11,9,10\n");
        assert!(matches!(
            load_reference_data(file.path(), 1000),
            Err(Error::Data(_))
        ));
    }
}
