//! Perturbation-based causality check for a single unit.
//!
//! The unit is computed on the reference table and on a copy whose last bar
//! has been shocked. Any difference before the last row means some earlier
//! output read the last bar.

use crate::compare::first_divergence;
use crate::perturbation::Perturbation;
use crate::verdict::Verdict;
use featlab_core::config::{AuditConfig, DEFAULT_TOLERANCE};
use featlab_core::{BarTable, Error, FeatureColumn, Result};
use featlab_features::FeatureUnit;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Audits units against a reference table.
#[derive(Debug, Clone)]
pub struct Auditor {
    tolerance: f64,
    timeout: Option<Duration>,
}

impl Default for Auditor {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            timeout: None,
        }
    }
}

impl Auditor {
    /// Auditor with the default tolerance and no time budget.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            timeout: config.unit_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Audit one unit. Never panics and never fails: every problem with the
    /// unit ends up in the verdict.
    pub fn audit_unit(&self, unit: &Arc<dyn FeatureUnit>, table: &BarTable) -> Verdict {
        let Some(perturbed_table) = Perturbation::STANDARD.apply(table) else {
            return Verdict::error("reference table is empty, nothing to perturb");
        };

        let original = match self.evaluate(unit, table) {
            Ok(column) => column,
            Err(e) => return Verdict::error(e.to_string()),
        };
        let perturbed = match self.evaluate(unit, &perturbed_table) {
            Ok(column) => column,
            Err(e) => return Verdict::error(e.to_string()),
        };

        match first_divergence(&original.values, &perturbed.values, self.tolerance) {
            Some(row) => {
                let ts_ms = table.timestamp(row).unwrap_or(row as i64);
                debug!(code = unit.code(), row, "Output moved before the last row");
                Verdict::fail(row, ts_ms)
            }
            None => Verdict::Pass,
        }
    }

    /// Compute one column, isolating panics and enforcing the time budget and
    /// the length contract.
    fn evaluate(&self, unit: &Arc<dyn FeatureUnit>, table: &BarTable) -> Result<FeatureColumn> {
        let column = match self.timeout {
            None => compute_guarded(unit.as_ref(), table)?,
            Some(budget) => compute_with_budget(unit, table, budget)?,
        };

        if column.len() != table.len() {
            return Err(Error::feature(format!(
                "{} returned {} values for {} rows",
                unit.code(),
                column.len(),
                table.len()
            )));
        }
        Ok(column)
    }
}

/// Run `compute`, turning a panic into a feature error.
fn compute_guarded(unit: &dyn FeatureUnit, table: &BarTable) -> Result<FeatureColumn> {
    match catch_unwind(AssertUnwindSafe(|| unit.compute(table))) {
        Ok(result) => result,
        Err(payload) => Err(Error::feature(format!(
            "{} panicked: {}",
            unit.code(),
            panic_message(payload.as_ref())
        ))),
    }
}

/// Run `compute` on a dedicated thread with its own copy of the table.
///
/// A unit that overruns the budget is left running on its detached thread;
/// its result is discarded.
fn compute_with_budget(
    unit: &Arc<dyn FeatureUnit>,
    table: &BarTable,
    budget: Duration,
) -> Result<FeatureColumn> {
    let (tx, rx) = mpsc::channel();
    let worker_unit = Arc::clone(unit);
    let worker_table = table.clone();

    thread::Builder::new()
        .name(format!("audit-{}", unit.code()))
        .spawn(move || {
            let result = compute_guarded(worker_unit.as_ref(), &worker_table);
            // The receiver is gone once the budget has expired
            let _ = tx.send(result);
        })?;

    match rx.recv_timeout(budget) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::Timeout {
            code: unit.code().to_string(),
            budget_ms: budget.as_millis() as u64,
        }),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::feature(format!(
            "{} worker exited without a result",
            unit.code()
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featlab_testkit::{
        random_walk_table, FailingUnit, FuturePeekUnit, IdentityUnit, OffsetUnit, PanickingUnit,
        ShortUnit, SleepingUnit, FAILING_MESSAGE, PANIC_MESSAGE,
    };

    fn budgeted(ms: u64) -> Auditor {
        Auditor::from_config(&AuditConfig {
            unit_timeout_ms: Some(ms),
            ..AuditConfig::default()
        })
    }

    fn audit(unit: impl FeatureUnit + 'static, table: &BarTable) -> Verdict {
        let unit: Arc<dyn FeatureUnit> = Arc::new(unit);
        Auditor::new().audit_unit(&unit, table)
    }

    #[test]
    fn test_identity_passes() {
        assert_eq!(audit(IdentityUnit, &random_walk_table(100, 1)), Verdict::Pass);
    }

    #[test]
    fn test_future_peek_fails_at_second_to_last_row() {
        let table = random_walk_table(100, 1);
        match audit(FuturePeekUnit, &table) {
            Verdict::Fail { row, ts_ms, .. } => {
                assert_eq!(row, 98);
                assert_eq!(ts_ms, table.timestamp(98).unwrap());
            }
            other => panic!("expected FAIL, got {other}"),
        }
    }

    #[test]
    fn test_from_config_applies_tolerance_and_budget() {
        let table = random_walk_table(50, 4);
        let shifted: Arc<dyn FeatureUnit> = Arc::new(OffsetUnit::for_table(&table, 5e-8, Some(10)));
        assert!(Auditor::new().audit_unit(&shifted, &table).is_fail());

        let config = AuditConfig {
            tolerance: 1e-6,
            unit_timeout_ms: Some(50),
            ..AuditConfig::default()
        };
        let auditor = Auditor::from_config(&config);
        assert_eq!(auditor.audit_unit(&shifted, &table), Verdict::Pass);

        let slow: Arc<dyn FeatureUnit> = Arc::new(SleepingUnit::new(2_000));
        assert!(auditor.audit_unit(&slow, &table).is_error());
    }

    #[test]
    fn test_error_carries_message() {
        let verdict = audit(FailingUnit, &random_walk_table(10, 1));
        assert_eq!(verdict, Verdict::error(FAILING_MESSAGE));
    }

    #[test]
    fn test_panic_becomes_error() {
        let verdict = audit(PanickingUnit, &random_walk_table(10, 1));
        assert!(verdict.is_error());
        assert!(verdict.to_string().contains(PANIC_MESSAGE));
    }

    #[test]
    fn test_misaligned_output_is_error() {
        let verdict = audit(ShortUnit, &random_walk_table(10, 1));
        assert!(verdict.is_error());
        assert!(verdict.to_string().contains("returned 9 values for 10 rows"));
    }

    #[test]
    fn test_empty_table_is_error() {
        let empty = BarTable::new(Vec::new()).unwrap();
        assert!(audit(IdentityUnit, &empty).is_error());
    }

    #[test]
    fn test_single_row_passes() {
        // Nothing precedes the last row, so nothing can move
        assert_eq!(audit(FuturePeekUnit, &random_walk_table(1, 1)), Verdict::Pass);
    }

    #[test]
    fn test_timeout() {
        let unit: Arc<dyn FeatureUnit> = Arc::new(SleepingUnit::new(2_000));
        let auditor = budgeted(50);
        let verdict = auditor.audit_unit(&unit, &random_walk_table(10, 1));
        assert_eq!(
            verdict,
            Verdict::error("unit fixture_sleeping exceeded time budget of 50 ms")
        );
    }

    #[test]
    fn test_budget_not_reached() {
        let unit: Arc<dyn FeatureUnit> = Arc::new(SleepingUnit::new(1));
        let auditor = budgeted(5_000);
        assert_eq!(auditor.audit_unit(&unit, &random_walk_table(10, 1)), Verdict::Pass);
    }

    #[test]
    fn test_panic_under_budget_becomes_error() {
        let unit: Arc<dyn FeatureUnit> = Arc::new(PanickingUnit);
        let auditor = budgeted(5_000);
        let verdict = auditor.audit_unit(&unit, &random_walk_table(10, 1));
        assert!(verdict.to_string().contains(PANIC_MESSAGE));
    }
}
