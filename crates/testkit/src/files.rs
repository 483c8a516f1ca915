//! On-disk fixtures: reference CSV files and unit manifests.

use featlab_core::{format_timestamp, Bar, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Write bars as a reference CSV with the standard header.
pub fn write_bars_csv(path: impl AsRef<Path>, bars: &[Bar]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;
    for bar in bars {
        writer.write_record([
            format_timestamp(bar.ts_ms),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `{id}.json` naming `code` as its compute entry point.
pub fn write_manifest(dir: impl AsRef<Path>, id: &str, code: &str) -> Result<PathBuf> {
    let manifest = serde_json::json!({
        "compute": code,
        "description": format!("fixture for {code}"),
    });
    let path = dir.as_ref().join(format!("{id}.json"));
    fs::write(&path, serde_json::to_string_pretty(&manifest)?)?;
    Ok(path)
}

/// Write `{id}.json` with arbitrary contents.
pub fn write_raw_manifest(dir: impl AsRef<Path>, id: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.as_ref().join(format!("{id}.json"));
    fs::write(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::random_walk_bars;

    #[test]
    fn test_write_bars_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        write_bars_csv(&path, &random_walk_bars(3, 9)).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "timestamp,open,high,low,close,volume");
        assert!(lines[1].starts_with("2024-01-01 00:00:00,100,"));
    }

    #[test]
    fn test_write_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "alpha", "risk_atr_14").unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["compute"], "risk_atr_14");
    }
}
