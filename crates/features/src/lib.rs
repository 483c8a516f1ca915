//! Feature computation for the featlab system.
//!
//! This crate handles:
//! - The feature unit interface and its function-backed implementation
//! - Rolling-window primitives with missing-value semantics
//! - Entropy, histogram, and regression helpers
//! - The built-in feature catalogue and its registry
//! - Computing feature matrices

pub mod catalogue;
pub mod engine;
pub mod entropy;
pub mod histogram;
pub mod registry;
pub mod regression;
pub mod rolling;
pub mod series;
pub mod unit;

pub use engine::{FeatureEngine, FeatureMatrix};
pub use histogram::Histogram;
pub use registry::FeatureRegistry;
pub use unit::{Family, FeatureUnit, FormulaFn, FormulaUnit};
