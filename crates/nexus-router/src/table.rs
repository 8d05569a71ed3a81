//! Routing table schema.
//!
//! ```toml
//! default_agent = "agent-001"
//! oversight_agent = "agent-004"
//! sensitive_keywords = ["sales"]
//!
//! [[rules]]
//! id = "sales"
//! keywords = ["lead", "prospect"]
//! agents = ["agent-017"]
//!
//!   [[rules.refinements]]
//!   keywords = ["nurture"]
//!   agents = ["agent-018"]
//!
//! [hubs]
//! "dept-05" = "agent-016"
//! ```

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use nexus_contracts::{
    agent::AgentId,
    error::{NexusError, NexusResult},
};

/// The routing table compiled into the crate.
pub const DEFAULT_ROUTING_TOML: &str = include_str!("../routes/routing.toml");

/// A secondary match, only tested when its parent rule matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refinement {
    pub keywords: Vec<String>,
    pub agents: Vec<AgentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Stable identifier used in logs.
    pub id: String,
    pub keywords: Vec<String>,
    pub agents: Vec<AgentId>,
    #[serde(default)]
    pub refinements: Vec<Refinement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    /// Result when no rule matches; also the hub of unmapped departments.
    pub default_agent: AgentId,

    /// Appended whenever the task mentions a sensitive keyword.
    pub oversight_agent: AgentId,

    #[serde(default)]
    pub sensitive_keywords: Vec<String>,

    /// Ordered rules. All matching rules contribute.
    #[serde(default)]
    pub rules: Vec<RouteRule>,

    /// Department id → coordinating agent.
    #[serde(default)]
    pub hubs: BTreeMap<String, AgentId>,
}

impl RoutingTable {
    pub fn from_toml_str(s: &str) -> NexusResult<Self> {
        toml::from_str(s).map_err(|e| NexusError::ConfigError {
            reason: format!("failed to parse routing TOML: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> NexusResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| NexusError::ConfigError {
            reason: format!("failed to read routing file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn builtin() -> NexusResult<Self> {
        Self::from_toml_str(DEFAULT_ROUTING_TOML)
    }

    /// Every agent id the table can produce, for checking against a registry.
    pub fn referenced_agents(&self) -> Vec<&AgentId> {
        let mut ids = vec![&self.default_agent, &self.oversight_agent];
        for rule in &self.rules {
            ids.extend(&rule.agents);
            for refinement in &rule.refinements {
                ids.extend(&refinement.agents);
            }
        }
        ids.extend(self.hubs.values());
        ids.sort();
        ids.dedup();
        ids
    }
}
