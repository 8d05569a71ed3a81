//! Keyword task router.
//!
//! Routing algorithm:
//!
//! 1. Lower-case the task text.
//! 2. For each rule in declaration order, if any keyword occurs, append the
//!    rule's agents, then test its refinements and append theirs.
//! 3. If nothing matched, the result is the default agent alone.
//! 4. If the task mentions a sensitive keyword, append the oversight agent
//!    unless it is already present.
//!
//! The result is never empty and never holds the same agent twice.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use nexus_contracts::{agent::AgentId, error::NexusResult};

use crate::table::RoutingTable;

#[derive(Debug, Clone)]
pub struct AgentRouter {
    table: RoutingTable,
}

impl AgentRouter {
    pub fn new(table: RoutingTable) -> Self {
        Self { table }
    }

    pub fn builtin() -> NexusResult<Self> {
        RoutingTable::builtin().map(Self::new)
    }

    pub fn from_toml_str(s: &str) -> NexusResult<Self> {
        RoutingTable::from_toml_str(s).map(Self::new)
    }

    pub fn from_file(path: &Path) -> NexusResult<Self> {
        RoutingTable::from_file(path).map(Self::new)
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Agents responsible for `task`, in rule order.
    ///
    /// `context` is accepted for callers that carry one; it does not
    /// influence the result.
    pub fn route(&self, task: &str, context: Option<&Value>) -> Vec<AgentId> {
        let task_lower = task.to_lowercase();
        let mut agents: Vec<AgentId> = Vec::new();

        for rule in &self.table.rules {
            if !mentions_any(&task_lower, &rule.keywords) {
                continue;
            }
            debug!(rule_id = %rule.id, "routing rule matched");
            push_all(&mut agents, &rule.agents);

            for refinement in &rule.refinements {
                if mentions_any(&task_lower, &refinement.keywords) {
                    push_all(&mut agents, &refinement.agents);
                }
            }
        }

        if agents.is_empty() {
            agents.push(self.table.default_agent.clone());
        }

        if mentions_any(&task_lower, &self.table.sensitive_keywords) {
            push_unique(&mut agents, &self.table.oversight_agent);
        }

        debug!(
            agents = agents.len(),
            has_context = context.is_some(),
            "task routed"
        );
        agents
    }

    /// Coordinating agent of `department_id`, or the default agent.
    pub fn department_hub(&self, department_id: &str) -> AgentId {
        self.table
            .hubs
            .get(department_id)
            .cloned()
            .unwrap_or_else(|| self.table.default_agent.clone())
    }
}

fn mentions_any(task_lower: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|k| !k.is_empty() && task_lower.contains(&k.to_lowercase()))
}

fn push_unique(agents: &mut Vec<AgentId>, agent: &AgentId) {
    if !agents.contains(agent) {
        agents.push(agent.clone());
    }
}

fn push_all(agents: &mut Vec<AgentId>, more: &[AgentId]) {
    for agent in more {
        push_unique(agents, agent);
    }
}
