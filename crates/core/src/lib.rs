//! Core types and configuration for the featlab system.
//!
//! This crate provides shared types used across all other crates:
//! - Bar and bar table types
//! - Feature output columns
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
