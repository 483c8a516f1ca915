//! Configuration structures for the featlab system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default absolute tolerance when comparing original and perturbed outputs.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Default number of reference rows kept after loading.
pub const DEFAULT_ROW_LIMIT: usize = 1000;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reference data configuration.
    pub data: DataConfig,
    /// Audit configuration.
    pub audit: AuditConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.data.row_limit == 0 {
            return Err(Error::config("data.row_limit must be greater than zero"));
        }
        if !self.data.delimiter.is_ascii() {
            return Err(Error::config("data.delimiter must be a single ASCII character"));
        }
        if !self.audit.tolerance.is_finite() || self.audit.tolerance < 0.0 {
            return Err(Error::config(format!(
                "audit.tolerance must be finite and non-negative, got {}",
                self.audit.tolerance
            )));
        }
        if self.audit.unit_timeout_ms == Some(0) {
            return Err(Error::config("audit.unit_timeout_ms must be greater than zero"));
        }
        Ok(())
    }
}

/// Reference dataset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path of the delimited reference file.
    pub reference_path: PathBuf,
    /// Rows kept from the start of the file.
    pub row_limit: usize,
    /// Field delimiter.
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            reference_path: PathBuf::from("eth_5m_test.csv"),
            row_limit: DEFAULT_ROW_LIMIT,
            delimiter: ',',
        }
    }
}

/// Look-ahead audit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Directory of unit manifests. `None` audits the whole built-in registry.
    pub units_dir: Option<PathBuf>,
    /// Absolute tolerance for present-vs-present comparisons.
    pub tolerance: f64,
    /// Number of parallel workers (0 = all cores, 1 = sequential).
    pub workers: usize,
    /// Wall-clock budget per `compute` call in milliseconds.
    pub unit_timeout_ms: Option<u64>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            units_dir: None,
            tolerance: DEFAULT_TOLERANCE,
            workers: 1,
            unit_timeout_ms: None,
        }
    }
}
