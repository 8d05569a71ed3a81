//! Keyword-based content scanning.
//!
//! Scan algorithm:
//!
//! 1. Lower-case the content once.
//! 2. For every check, in declaration order, skip it if its market condition
//!    does not match the context; otherwise test its keywords.
//! 3. Each check that fires appends its violation text and raises the scan
//!    severity to at least its own. Severity never goes down.
//! 4. The report passes iff nothing fired; only a failing report carries a
//!    corrections summary.

use std::path::Path;

use tracing::{debug, warn};

use nexus_contracts::{
    error::NexusResult,
    ethics::{ScanReport, Severity},
    message::MessageContext,
};

use crate::rule::EthicsConfig;

#[derive(Debug, Clone)]
pub struct EthicsValidator {
    config: EthicsConfig,
}

impl EthicsValidator {
    pub fn new(config: EthicsConfig) -> Self {
        Self { config }
    }

    /// A validator over the embedded default rule set.
    pub fn builtin() -> NexusResult<Self> {
        EthicsConfig::builtin().map(Self::new)
    }

    pub fn from_toml_str(s: &str) -> NexusResult<Self> {
        EthicsConfig::from_toml_str(s).map(Self::new)
    }

    pub fn from_file(path: &Path) -> NexusResult<Self> {
        EthicsConfig::from_file(path).map(Self::new)
    }

    pub fn config(&self) -> &EthicsConfig {
        &self.config
    }

    /// Scan `content` against every check.
    pub fn scan_content(&self, content: &str, context: &MessageContext) -> ScanReport {
        let content_lower = content.to_lowercase();
        let market = context.target_market.as_deref();

        let mut severity = Severity::None;
        let mut violations = Vec::new();

        for check in &self.config.checks {
            if !check.applies_to(market) || !check.fires_on(&content_lower) {
                continue;
            }
            debug!(check_id = %check.id, severity = ?check.severity, "ethics check fired");
            violations.push(check.violation.clone());
            severity = severity.max(check.severity);
        }

        if violations.is_empty() {
            return ScanReport::clean();
        }

        warn!(
            severity = ?severity,
            violations = violations.len(),
            "content failed ethics scan"
        );
        let corrections = format!("Consider revising to remove: {}", violations.join(", "));
        ScanReport {
            passed: false,
            severity,
            violations,
            corrections: Some(corrections),
        }
    }
}
