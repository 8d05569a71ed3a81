//! Workflow definitions, step records, and execution outcomes.
//!
//! A `Workflow` is created and owned by the engine. Its status only moves
//! forward: `Pending → InProgress → {Completed | Failed}`, and a terminal
//! status is never left.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::AgentId;

/// Unique identifier of a workflow, rendered as `wf-<uuid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(pub String);

impl WorkflowId {
    /// Create a new, unique workflow ID.
    pub fn new() -> Self {
        Self(format!("wf-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkflowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Pending or in progress.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Whether moving from `self` to `next` respects the forward-only order.
    pub fn can_transition_to(self, next: WorkflowStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::InProgress) => true,
            (Self::Pending | Self::InProgress, Self::Completed | Self::Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Failed,
}

/// Result record written into a step once it has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    pub status: StepStatus,
    pub timestamp: DateTime<Utc>,
    /// Human-readable summary referencing the responsible agent.
    pub result: String,
}

impl StepOutput {
    pub fn completed(result: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Completed,
            timestamp: Utc::now(),
            result: result.into(),
        }
    }
}

/// One step of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// 1-based sequence number, unique within the workflow.
    pub step: u32,
    pub action: String,
    pub agent: AgentId,
    /// Dependency expression, e.g. `step:2,3:complete` or `parallel:1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    /// `None` until the step has run.
    pub output: Option<StepOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub workflow_id: WorkflowId,
    pub name: String,
    pub description: String,
    pub steps: Vec<WorkflowStep>,
    pub status: WorkflowStatus,
    pub coordinator: Option<AgentId>,
    pub created_at: DateTime<Utc>,
}

impl Workflow {
    pub fn step(&self, number: u32) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.step == number)
    }

    pub fn step_mut(&mut self, number: u32) -> Option<&mut WorkflowStep> {
        self.steps.iter_mut().find(|s| s.step == number)
    }
}

/// Declaration of a step before it belongs to a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub step: u32,
    pub action: String,
    pub agent: AgentId,
    #[serde(default)]
    pub trigger: Option<String>,
}

impl StepSpec {
    pub fn new(step: u32, action: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            step,
            action: action.into(),
            agent: AgentId::new(agent),
            trigger: None,
        }
    }

    pub fn after(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }
}

/// Everything needed to create a workflow. Produced by templates and callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    pub name: String,
    pub description: String,
    pub coordinator: Option<AgentId>,
    pub steps: Vec<StepSpec>,
}

/// What `execute_workflow` reports back.
///
/// None of these are errors: an unknown id or a workflow that is already
/// running is logged and reported, never raised.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// No workflow with that id is registered.
    NotFound,
    /// The workflow was not `Pending`, so it was left untouched.
    NotRunnable { status: WorkflowStatus },
    /// Every step ran and the workflow is `Completed`.
    Completed,
    /// The workflow ended in `Failed`.
    Failed { reason: String },
}
