//! The built-in catalogue under audit.

use featlab_audit::{audit_units, registry_units, Auditor, Verdict};
use featlab_features::{FeatureEngine, FeatureRegistry};
use featlab_testkit::random_walk_table;

/// Units that aggregate over the whole table and therefore read the last bar.
const WHOLE_TABLE_UNITS: [&str; 2] = ["entropy_hour_agg", "hybrid_volume_trend_conflict_20"];

#[test]
fn test_every_unit_is_aligned() {
    let table = random_walk_table(1000, 21);
    let registry = FeatureRegistry::builtin();
    let matrix = FeatureEngine::from_registry(&registry).compute(&table).unwrap();
    assert_eq!(matrix.columns().len(), registry.len());
    for column in matrix.columns() {
        assert_eq!(column.len(), table.len(), "{}", column.name);
    }
}

#[test]
fn test_only_whole_table_units_fail() {
    let table = random_walk_table(1000, 21);
    let registry = FeatureRegistry::builtin();
    let units = registry_units(&registry);

    let entries = audit_units(&units, &table, &Auditor::new(), 0).unwrap();
    assert_eq!(entries.len(), registry.len());

    for entry in &entries {
        let expect_fail = WHOLE_TABLE_UNITS.contains(&entry.id.as_str());
        match &entry.verdict {
            Verdict::Pass => assert!(!expect_fail, "{} should have been flagged", entry.id),
            Verdict::Fail { row, .. } => {
                assert!(expect_fail, "{} flagged at row {row}", entry.id)
            }
            Verdict::Error { message } => panic!("{} errored: {message}", entry.id),
        }
    }
}

#[test]
fn test_hour_aggregate_fails_at_first_row() {
    let table = random_walk_table(1000, 22);
    let registry = FeatureRegistry::builtin();
    let unit = registry.get("entropy_hour_agg").unwrap();
    match Auditor::new().audit_unit(&unit, &table) {
        Verdict::Fail { row, .. } => assert_eq!(row, 0),
        other => panic!("expected FAIL, got {other}"),
    }
}
