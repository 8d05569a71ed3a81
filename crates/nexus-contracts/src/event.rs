//! Bus events and their payloads.
//!
//! Event type strings are dot-namespaced (`domain.verb` or
//! `domain.verb.verb`). Consumers subscribe by exact string or by the
//! wildcard [`event_types::WILDCARD`]; new types may be added freely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{agent::AgentId, workflow::WorkflowId};

/// Well-known event type strings.
pub mod event_types {
    /// Subscription key that receives every published event.
    pub const WILDCARD: &str = "*";

    pub const LEAD_DISCOVERED: &str = "lead.discovered";
    pub const STRESS_DETECTED: &str = "stress.detected";
    pub const STRATEGIC_PLANNING_REQUESTED: &str = "strategic.planning.requested";
    pub const CONTENT_CREATION_REQUESTED: &str = "content.creation.requested";

    pub const WORKFLOW_CREATED: &str = "workflow.created";
    pub const WORKFLOW_STARTED: &str = "workflow.started";
    pub const WORKFLOW_STEP_STARTED: &str = "workflow.step.started";
    pub const WORKFLOW_STEP_COMPLETED: &str = "workflow.step.completed";
    pub const WORKFLOW_STEP_FAILED: &str = "workflow.step.failed";
    pub const WORKFLOW_COMPLETED: &str = "workflow.completed";
    pub const WORKFLOW_FAILED: &str = "workflow.failed";
}

/// Unique identifier of one published event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub uuid::Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of content requested from the creative department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Visual,
    Audio,
}

/// Typed event payloads, one variant per event category.
///
/// `Data` is the open-schema fallback for event types this crate does not
/// know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    Lead {
        lead_id: String,
        #[serde(default)]
        details: Map<String, Value>,
    },
    Stress {
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        level: Option<String>,
    },
    StrategicPlanning {
        goal: String,
        #[serde(default)]
        requirements: Value,
    },
    ContentCreation {
        content_type: ContentType,
        #[serde(default)]
        specs: Value,
    },
    Workflow {
        workflow_id: WorkflowId,
        name: String,
    },
    WorkflowStep {
        workflow_id: WorkflowId,
        step: u32,
        agent: AgentId,
        /// Wall-clock time the step took, in milliseconds. Zero on `started`.
        #[serde(default)]
        duration_ms: u64,
    },
    WorkflowFailed {
        workflow_id: WorkflowId,
        name: String,
        reason: String,
    },
    Data {
        #[serde(default)]
        fields: Map<String, Value>,
    },
}

impl EventPayload {
    /// An empty open-schema payload.
    pub fn empty() -> Self {
        Self::Data { fields: Map::new() }
    }

    /// The workflow this payload refers to, for workflow lifecycle events.
    pub fn workflow_id(&self) -> Option<&WorkflowId> {
        match self {
            Self::Workflow { workflow_id, .. }
            | Self::WorkflowStep { workflow_id, .. }
            | Self::WorkflowFailed { workflow_id, .. } => Some(workflow_id),
            _ => None,
        }
    }
}

/// One event on the bus. Immutable once published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_type: String,
    pub event_id: EventId,
    pub timestamp: DateTime<Utc>,
    pub publisher: String,
    pub payload: EventPayload,
    /// Informational only; delivery follows live subscriptions.
    #[serde(default)]
    pub subscribers: Vec<String>,
}

impl Event {
    /// Build an event with a fresh id and the current timestamp.
    pub fn new(
        event_type: impl Into<String>,
        publisher: impl Into<String>,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            event_id: EventId::new(),
            timestamp: Utc::now(),
            publisher: publisher.into(),
            payload,
            subscribers: Vec::new(),
        }
    }
}
