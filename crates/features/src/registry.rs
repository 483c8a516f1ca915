//! Feature registry, keyed by unit code.

use crate::catalogue;
use crate::unit::FeatureUnit;
use featlab_core::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registered feature units, iterated in code order.
#[derive(Clone, Default)]
pub struct FeatureRegistry {
    units: BTreeMap<String, Arc<dyn FeatureUnit>>,
}

impl FeatureRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the whole built-in catalogue.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for unit in catalogue::all() {
            // Catalogue codes are unique, checked by the catalogue tests
            registry
                .units
                .insert(unit.code().to_string(), Arc::new(unit));
        }
        registry
    }

    /// Add a unit. Codes must be unique.
    pub fn register(&mut self, unit: Arc<dyn FeatureUnit>) -> Result<()> {
        let code = unit.code().to_string();
        if self.units.contains_key(&code) {
            return Err(Error::config(format!("feature code {code} registered twice")));
        }
        self.units.insert(code, unit);
        Ok(())
    }

    /// Look up a unit by code.
    pub fn get(&self, code: &str) -> Option<Arc<dyn FeatureUnit>> {
        self.units.get(code).cloned()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.units.contains_key(code)
    }

    /// Every registered code, sorted.
    pub fn codes(&self) -> Vec<&str> {
        self.units.keys().map(String::as_str).collect()
    }

    /// Units in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn FeatureUnit>> {
        self.units.values()
    }

    /// Resolve a list of codes, failing on the first unknown one.
    pub fn select(&self, codes: &[String]) -> Result<Vec<Arc<dyn FeatureUnit>>> {
        codes
            .iter()
            .map(|code| {
                self.get(code)
                    .ok_or_else(|| Error::config(format!("unknown feature code: {code}")))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl std::fmt::Debug for FeatureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureRegistry")
            .field("units", &self.units.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Family, FormulaUnit};
    use featlab_core::BarTable;

    fn zeros(table: &BarTable) -> Vec<f64> {
        vec![0.0; table.len()]
    }

    #[test]
    fn test_builtin_holds_catalogue() {
        let registry = FeatureRegistry::builtin();
        assert_eq!(registry.len(), catalogue::all().len());
        assert!(registry.contains("vol_vol_of_vol_50"));
        assert!(registry.get("no_such_unit").is_none());
    }

    #[test]
    fn test_codes_sorted() {
        let registry = FeatureRegistry::builtin();
        let codes = registry.codes();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = FeatureRegistry::new();
        let unit = FormulaUnit::new("zeros", Family::Trend, 0, "", zeros);
        registry.register(Arc::new(unit.clone())).unwrap();
        assert!(registry.register(Arc::new(unit)).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_select_unknown_code() {
        let registry = FeatureRegistry::builtin();
        let picked = registry
            .select(&["risk_atr_14".to_string(), "trend_cum_return".to_string()])
            .unwrap();
        assert_eq!(picked.len(), 2);
        assert!(registry.select(&["missing".to_string()]).is_err());
    }
}
