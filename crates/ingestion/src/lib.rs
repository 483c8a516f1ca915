//! Reference data ingestion for the featlab system.
//!
//! This crate handles:
//! - Header normalization (case-insensitive column lookup)
//! - Timestamp parsing
//! - Loading and truncating the reference OHLCV file

pub mod loader;
pub mod normalize;
pub mod timestamp;

pub use loader::{load_reference_data, load_with_options, LoadOptions};
pub use normalize::{normalize_columns, ColumnLayout};
pub use timestamp::parse_timestamp;
