//! Shared fixtures for featlab tests.
//!
//! - Deterministic synthetic bar tables
//! - Fixture feature units with known causal behaviour
//! - Reference CSV and unit manifest writers

pub mod files;
pub mod fixture_units;
pub mod tables;

pub use files::{write_bars_csv, write_manifest, write_raw_manifest};
pub use fixture_units::{
    FailingUnit, FutureFieldPeekUnit, FuturePeekUnit, IdentityUnit, OffsetUnit, PanickingUnit, ShortUnit,
    SleepingUnit, WarmupUnit, FAILING_MESSAGE, PANIC_MESSAGE,
};
pub use tables::{random_walk_bars, random_walk_table, SplitMix};
