//! Audit run report.

use crate::verdict::Verdict;
use featlab_core::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

/// Verdict for one audited unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    /// Manifest file name, or unit code when auditing the registry.
    pub id: String,
    /// Unit code, absent when the unit failed to load.
    pub code: Option<String>,
    pub verdict: Verdict,
}

/// All verdicts of one run, in identifier order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    /// Rows in the reference table.
    pub rows: usize,
    pub entries: Vec<AuditEntry>,
}

impl AuditReport {
    pub fn new(rows: usize, entries: Vec<AuditEntry>) -> Self {
        Self { rows, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by identifier.
    pub fn get(&self, id: &str) -> Option<&AuditEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Causality violations only.
    pub fn failures(&self) -> Vec<&AuditEntry> {
        self.entries.iter().filter(|e| e.verdict.is_fail()).collect()
    }

    /// Units that did not pass: violations and evaluation errors.
    pub fn non_passing(&self) -> Vec<&AuditEntry> {
        self.entries.iter().filter(|e| !e.verdict.is_pass()).collect()
    }

    pub fn passed(&self) -> usize {
        self.entries.iter().filter(|e| e.verdict.is_pass()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|e| e.verdict.is_pass())
    }

    /// `0` when every unit passed, `1` otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_clean() {
            0
        } else {
            1
        }
    }

    /// Plain-text report: one line per unit, then the summary of non-passing
    /// units.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(out, "{}: {}", entry.id, entry.verdict);
        }

        out.push('\n');
        out.push_str("Summary of Failures:\n");
        let non_passing = self.non_passing();
        if non_passing.is_empty() {
            out.push_str("No lookahead bias detected.\n");
        } else {
            for entry in non_passing {
                let _ = writeln!(out, "{}: {}", entry.id, entry.verdict);
            }
        }
        out
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to `path`.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        info!(path = %path.as_ref().display(), "Wrote JSON report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, verdict: Verdict) -> AuditEntry {
        AuditEntry {
            id: id.to_string(),
            code: Some(id.to_string()),
            verdict,
        }
    }

    fn mixed() -> AuditReport {
        AuditReport::new(
            1000,
            vec![
                entry("a", Verdict::Pass),
                entry("b", Verdict::error("boom")),
                entry("c", Verdict::fail(998, 0)),
            ],
        )
    }

    #[test]
    fn test_filters() {
        let report = mixed();
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].id, "c");
        assert_eq!(report.non_passing().len(), 2);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_render_text() {
        let text = mixed().render_text();
        let expected = "a: PASS\n\
                        b: ERROR: boom\n\
                        c: FAIL: Lookahead detected at index 998 (1970-01-01 00:00:00)\n\
                        \n\
                        Summary of Failures:\n\
                        b: ERROR: boom\n\
                        c: FAIL: Lookahead detected at index 998 (1970-01-01 00:00:00)\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_clean() {
        let report = AuditReport::new(10, vec![entry("a", Verdict::Pass)]);
        assert!(report.render_text().ends_with("Summary of Failures:\nNo lookahead bias detected.\n"));
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_json_round() {
        let json: serde_json::Value = serde_json::from_str(&mixed().to_json().unwrap()).unwrap();
        assert_eq!(json["rows"], 1000);
        assert_eq!(json["entries"][1]["verdict"]["status"], "ERROR");
        assert_eq!(json["entries"][1]["verdict"]["message"], "boom");
    }
}
