//! Agent and department records.
//!
//! Agents are created once from the static registry and mutated in place
//! (status, alignment score) as the network runs. They are never destroyed
//! during the lifetime of a process.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::message::Priority;

/// Stable, human-readable identifier for an agent.
///
/// Used across routing tables, workflow steps, messages, and metrics.
/// Example: AgentId("agent-017")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier of a department, e.g. `dept-05`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(pub String);

impl DepartmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runtime status of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentStatus {
    Idle,
    Working,
    Collaborating,
    Conflict,
    Offline,
}

/// How much an agent may do without supervision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorityLevel {
    /// Acts on its own decisions.
    Autonomous,
    /// Executes directives issued by others.
    Execution,
    /// Advises only; never acts.
    Advisory,
}

/// A single agent record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    /// Display name of the owning department.
    pub department: String,
    /// Foreign key into the department table. Must resolve.
    pub department_id: DepartmentId,
    pub status: AgentStatus,
    pub authority: AuthorityLevel,
    /// What the agent is doing right now, if anything.
    pub current_task: Option<String>,
    /// 0–100.
    pub alignment_score: u8,
    /// Data or topic names the agent consumes.
    pub inputs: Vec<String>,
    /// Data or topic names the agent produces.
    pub outputs: Vec<String>,
    pub description: String,
    pub integrations: Vec<String>,
    pub priority: Priority,
    /// Opaque model identifier; the runtime never interprets it.
    pub llm_model: String,
    pub active: bool,
}

/// Read-only department reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    /// Declared headcount. Informational; not checked against the registry.
    pub agent_count: u32,
    pub description: String,
}
