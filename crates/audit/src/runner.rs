//! Batch audit: load the reference data, discover units, audit each one.

use crate::auditor::Auditor;
use crate::discovery::{discover_units, registry_units, DiscoveredUnit, UnitSource};
use crate::report::{AuditEntry, AuditReport};
use crate::verdict::Verdict;
use featlab_core::{BarTable, Config, Error, Result};
use featlab_features::FeatureRegistry;
use featlab_ingestion::{load_with_options, LoadOptions};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Audit the units of `units_dir` (or the whole built-in registry) against the
/// reference file, with default settings otherwise.
pub fn run_audit(units_dir: Option<&Path>, reference_path: &Path) -> Result<AuditReport> {
    let mut config = Config::default();
    config.data.reference_path = reference_path.to_path_buf();
    config.audit.units_dir = units_dir.map(Path::to_path_buf);
    run_audit_with(&config, &FeatureRegistry::builtin())
}

/// Audit according to `config`, resolving manifests against `registry`.
///
/// Fails only on fatal problems: invalid configuration, missing or malformed
/// reference data, an unreadable units directory. Unit problems become
/// verdicts.
pub fn run_audit_with(config: &Config, registry: &FeatureRegistry) -> Result<AuditReport> {
    config.validate()?;

    let table = load_with_options(&config.data.reference_path, LoadOptions::from_config(&config.data))?;

    let units = match &config.audit.units_dir {
        Some(dir) => discover_units(dir, registry)?,
        None => registry_units(registry),
    };

    let auditor = Auditor::from_config(&config.audit);
    let entries = audit_units(&units, &table, &auditor, config.audit.workers)?;
    let report = AuditReport::new(table.len(), entries);

    info!(
        units = report.len(),
        passed = report.passed(),
        failed = report.failures().len(),
        errored = report.non_passing().len() - report.failures().len(),
        "Audit complete"
    );
    Ok(report)
}

/// Audit every candidate against `table`.
///
/// `workers = 1` runs sequentially; `0` uses every core; `n > 1` uses `n`
/// threads. Entries come back in candidate order either way.
pub fn audit_units(
    units: &[DiscoveredUnit],
    table: &BarTable,
    auditor: &Auditor,
    workers: usize,
) -> Result<Vec<AuditEntry>> {
    if workers == 1 {
        return Ok(units.iter().map(|u| audit_one(u, table, auditor)).collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| Error::Other(format!("failed to build audit thread pool: {e}")))?;
    Ok(pool.install(|| {
        units
            .par_iter()
            .map(|u| audit_one(u, table, auditor))
            .collect()
    }))
}

fn audit_one(unit: &DiscoveredUnit, table: &BarTable, auditor: &Auditor) -> AuditEntry {
    let verdict = match &unit.source {
        UnitSource::Loaded(feature) => auditor.audit_unit(feature, table),
        UnitSource::Broken(reason) => Verdict::error(reason.clone()),
    };

    if verdict.is_pass() {
        debug!(id = %unit.id, "PASS");
    } else {
        warn!(id = %unit.id, verdict = %verdict, "Unit did not pass");
    }

    AuditEntry {
        id: unit.id.clone(),
        code: unit.code().map(str::to_string),
        verdict,
    }
}
