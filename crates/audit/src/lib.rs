//! Look-ahead bias auditing for featlab feature units.
//!
//! This crate handles:
//! - Perturbing the last bar of a reference table
//! - Comparing original and perturbed outputs row by row
//! - Discovering units from a directory of manifests
//! - Running a batch audit and reporting the verdicts

pub mod auditor;
pub mod compare;
pub mod discovery;
pub mod perturbation;
pub mod report;
pub mod runner;
pub mod verdict;

pub use auditor::Auditor;
pub use compare::first_divergence;
pub use discovery::{discover_units, registry_units, DiscoveredUnit, UnitManifest, UnitSource};
pub use perturbation::Perturbation;
pub use report::{AuditEntry, AuditReport};
pub use runner::{audit_units, run_audit, run_audit_with};
pub use verdict::Verdict;
