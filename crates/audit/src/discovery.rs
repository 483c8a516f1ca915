//! Unit discovery from a directory of JSON manifests.
//!
//! A manifest names the registered unit it exposes:
//!
//! ```json
//! { "compute": "vol_vol_of_vol_50", "description": "vol of vol" }
//! ```
//!
//! Keys other than `compute` are ignored. Manifests without a `compute` entry, or naming a code the registry does not
//! provide, are not units and are skipped. Manifests that cannot be read or
//! parsed are kept as broken units so the report shows the load failure.

use featlab_core::{Error, Result};
use featlab_features::{FeatureRegistry, FeatureUnit};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Extension of unit manifests.
pub const MANIFEST_EXTENSION: &str = "json";

/// Contents of a unit manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitManifest {
    /// Code of the registered unit to audit.
    #[serde(default)]
    pub compute: Option<String>,
}

impl UnitManifest {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::manifest(e.to_string()))
    }
}

/// How a discovered candidate resolved.
#[derive(Clone)]
pub enum UnitSource {
    /// A registered unit, ready to audit.
    Loaded(Arc<dyn FeatureUnit>),
    /// The manifest could not be loaded; audited as an ERROR.
    Broken(String),
}

/// One audit candidate, identified by its manifest file name.
#[derive(Clone)]
pub struct DiscoveredUnit {
    pub id: String,
    pub source: UnitSource,
}

impl DiscoveredUnit {
    pub fn loaded(id: impl Into<String>, unit: Arc<dyn FeatureUnit>) -> Self {
        Self {
            id: id.into(),
            source: UnitSource::Loaded(unit),
        }
    }

    pub fn broken(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: UnitSource::Broken(reason.into()),
        }
    }

    /// Code of the underlying unit, when it loaded.
    pub fn code(&self) -> Option<&str> {
        match &self.source {
            UnitSource::Loaded(unit) => Some(unit.code()),
            UnitSource::Broken(_) => None,
        }
    }
}

impl std::fmt::Debug for DiscoveredUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("DiscoveredUnit");
        s.field("id", &self.id);
        match &self.source {
            UnitSource::Loaded(unit) => s.field("code", &unit.code()),
            UnitSource::Broken(reason) => s.field("broken", reason),
        };
        s.finish()
    }
}

/// Every registry unit as a candidate, identified by its code.
pub fn registry_units(registry: &FeatureRegistry) -> Vec<DiscoveredUnit> {
    registry
        .iter()
        .map(|unit| DiscoveredUnit::loaded(unit.code(), Arc::clone(unit)))
        .collect()
}

/// List the units in `dir`, sorted by file name.
///
/// A missing directory yields no units. Other read failures are errors.
pub fn discover_units(dir: impl AsRef<Path>, registry: &FeatureRegistry) -> Result<Vec<DiscoveredUnit>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "Units directory not found, nothing to audit");
        return Ok(Vec::new());
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(MANIFEST_EXTENSION) {
            continue;
        }
        let Some(id) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        candidates.push((id, path));
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    let mut units = Vec::with_capacity(candidates.len());
    for (id, path) in candidates {
        let manifest = match fs::read_to_string(&path)
            .map_err(Error::from)
            .and_then(|raw| UnitManifest::from_json_str(&raw))
        {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(id = %id, error = %e, "Unit manifest could not be loaded");
                units.push(DiscoveredUnit::broken(id, e.to_string()));
                continue;
            }
        };

        let Some(code) = manifest.compute else {
            debug!(id = %id, "Skipping manifest without a compute entry");
            continue;
        };
        match registry.get(&code) {
            Some(unit) => units.push(DiscoveredUnit::loaded(id, unit)),
            None => debug!(id = %id, code = %code, "Skipping manifest naming an unknown unit"),
        }
    }

    info!(dir = %dir.display(), units = units.len(), "Discovered units");
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use featlab_testkit::{write_manifest, write_raw_manifest};

    fn ids(units: &[DiscoveredUnit]) -> Vec<&str> {
        units.iter().map(|u| u.id.as_str()).collect()
    }

    #[test]
    fn test_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FeatureRegistry::builtin();
        write_manifest(dir.path(), "zeta", "risk_atr_14").unwrap();
        write_manifest(dir.path(), "alpha", "vol_vol_of_vol_50").unwrap();
        write_manifest(dir.path(), "ghost", "not_a_unit").unwrap();
        write_raw_manifest(dir.path(), "notes", r#"{"description": "no entry point"}"#).unwrap();
        fs::write(dir.path().join("readme.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let units = discover_units(dir.path(), &registry).unwrap();
        assert_eq!(ids(&units), vec!["alpha.json", "zeta.json"]);
        assert_eq!(units[0].code(), Some("vol_vol_of_vol_50"));
    }

    #[test]
    fn test_broken_manifest_kept() {
        let dir = tempfile::tempdir().unwrap();
        write_raw_manifest(dir.path(), "bad", "{ not json").unwrap();

        let units = discover_units(dir.path(), &FeatureRegistry::builtin()).unwrap();
        assert_eq!(ids(&units), vec!["bad.json"]);
        assert!(matches!(units[0].source, UnitSource::Broken(_)));
        assert_eq!(units[0].code(), None);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let units = discover_units(dir.path().join("absent"), &FeatureRegistry::builtin()).unwrap();
        assert!(units.is_empty());
    }

    #[test]
    fn test_registry_units_use_codes() {
        let registry = FeatureRegistry::builtin();
        let units = registry_units(&registry);
        assert_eq!(units.len(), registry.len());
        assert_eq!(units[0].id, registry.codes()[0]);
    }
}
