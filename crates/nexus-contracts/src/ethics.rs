//! Ethics scan verdict types.
//!
//! The validator consumes content plus a `MessageContext` and produces a
//! `ScanReport`. A report passes only when no check fired.

use serde::{Deserialize, Serialize};

/// Severity grade of a scan. Ordered, so the highest grade seen wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

/// Outcome of scanning one piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// True iff `violations` is empty.
    pub passed: bool,
    pub severity: Severity,
    /// One description per fired check, in evaluation order.
    pub violations: Vec<String>,
    /// Present only when at least one check fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrections: Option<String>,
}

impl ScanReport {
    pub fn clean() -> Self {
        Self {
            passed: true,
            severity: Severity::None,
            violations: Vec::new(),
            corrections: None,
        }
    }
}
