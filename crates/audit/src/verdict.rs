//! Audit verdicts.

use featlab_core::{format_timestamp, TimestampMs};
use serde::Serialize;
use std::fmt;

/// Outcome of auditing one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum Verdict {
    /// No output before the last row moved when the last bar was perturbed.
    Pass,
    /// Causality violation: the earliest row whose value moved.
    Fail {
        row: usize,
        ts_ms: TimestampMs,
        timestamp: String,
    },
    /// The unit could not be evaluated.
    Error { message: String },
}

impl Verdict {
    pub fn fail(row: usize, ts_ms: TimestampMs) -> Self {
        Verdict::Fail {
            row,
            ts_ms,
            timestamp: format_timestamp(ts_ms),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Verdict::Error {
            message: message.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Verdict::Fail { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Verdict::Error { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("PASS"),
            Verdict::Fail { row, timestamp, .. } => {
                write!(f, "FAIL: Lookahead detected at index {row} ({timestamp})")
            }
            Verdict::Error { message } => write!(f, "ERROR: {message}"),
        }
    }
}
