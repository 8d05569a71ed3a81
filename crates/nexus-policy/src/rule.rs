//! Ethics check and message policy schemas.
//!
//! An `EthicsConfig` is deserialized from TOML and holds an ordered list of
//! `EthicsCheck`s. Every check is evaluated on every scan; there is no
//! first-match short circuit.
//!
//! A `MessagePolicy` holds the keyword tables and thresholds the message
//! builder uses to derive a message's advisory flags.

use std::path::Path;

use serde::{Deserialize, Serialize};

use nexus_contracts::{
    error::{NexusError, NexusResult},
    ethics::Severity,
};

/// The rule file compiled into the crate.
pub const DEFAULT_ETHICS_TOML: &str = include_str!("../policies/ethics.toml");

/// A single keyword check loaded from TOML.
///
/// Example:
/// ```toml
/// [[checks]]
/// id = "coercive-sales"
/// violation = "Coercive sales language detected"
/// severity = "high"
/// keywords = ["limited time only", "you must buy"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthicsCheck {
    /// Stable identifier used in logs.
    pub id: String,

    /// Text appended to the report's violations when the check fires.
    pub violation: String,

    pub severity: Severity,

    /// Phrases that trigger the check. An empty list never fires.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// When set, the check only runs if the scan context targets exactly
    /// this market.
    #[serde(default)]
    pub target_market: Option<String>,
}

impl EthicsCheck {
    /// Whether the check applies to content aimed at `market`.
    pub fn applies_to(&self, market: Option<&str>) -> bool {
        match (&self.target_market, market) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted == actual,
            (Some(_), None) => false,
        }
    }

    /// Whether any keyword occurs in `content_lower`, which must already be
    /// lower-cased.
    pub fn fires_on(&self, content_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && content_lower.contains(&k.to_lowercase()))
    }
}

/// The top-level structure deserialized from an ethics rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthicsConfig {
    /// Ordered list of checks. Violations are reported in this order.
    pub checks: Vec<EthicsCheck>,
}

impl EthicsConfig {
    pub fn from_toml_str(s: &str) -> NexusResult<Self> {
        toml::from_str(s).map_err(|e| NexusError::ConfigError {
            reason: format!("failed to parse ethics TOML: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> NexusResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| NexusError::ConfigError {
            reason: format!("failed to read ethics file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The embedded default rule set.
    pub fn builtin() -> NexusResult<Self> {
        Self::from_toml_str(DEFAULT_ETHICS_TOML)
    }
}

/// Keyword tables and thresholds for message flag derivation.
///
/// Every field has a default, so an empty TOML document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagePolicy {
    /// An action containing any of these, in any case, needs an ethics
    /// check.
    pub ethics_keywords: Vec<String>,

    /// `data.amount` strictly above this needs human approval.
    pub approval_amount_threshold: f64,

    /// An action containing any of these needs human approval. This and
    /// the keywords below are case-sensitive.
    pub legal_keywords: Vec<String>,

    /// An action containing this keyword, with `data.severity` equal to
    /// `acute_severity`, needs human approval.
    pub acute_care_keyword: String,
    pub acute_severity: String,

    /// An action containing all of these needs human approval.
    pub pivot_keywords: Vec<String>,

    /// Time to live stamped on every message, in seconds.
    pub default_ttl_secs: u64,
}

impl Default for MessagePolicy {
    fn default() -> Self {
        Self {
            ethics_keywords: [
                "sales",
                "outreach",
                "communication",
                "spiritual",
                "healing",
                "ritual",
                "offer",
                "pricing",
            ]
            .map(String::from)
            .to_vec(),
            approval_amount_threshold: 1000.0,
            legal_keywords: vec!["contract".to_string(), "legal".to_string()],
            acute_care_keyword: "healing".to_string(),
            acute_severity: "acute".to_string(),
            pivot_keywords: vec!["strategic".to_string(), "pivot".to_string()],
            default_ttl_secs: 3600,
        }
    }
}

impl MessagePolicy {
    pub fn from_toml_str(s: &str) -> NexusResult<Self> {
        toml::from_str(s).map_err(|e| NexusError::ConfigError {
            reason: format!("failed to parse message policy TOML: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> NexusResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| NexusError::ConfigError {
            reason: format!("failed to read message policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}
