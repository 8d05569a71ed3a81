//! Inter-agent message envelopes.
//!
//! Messages are constructed once by the message builder and never mutated.
//! The `ethics_check` and `requires_human_approval` flags are advisory: they
//! are derived at construction time, and enforcement happens in a separate
//! validation call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::AgentId;

/// Unique identifier of one message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub uuid::Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Request,
    Response,
    Event,
    Alert,
    Directive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// The data carried by a message.
///
/// The two fields the approval policy reads are typed; anything else lands in
/// `extra` so callers can still attach free-form data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageData {
    /// Monetary amount attached to the request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Case severity, e.g. "acute".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageData {
    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Contextual hints consumed by the ethics validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContext {
    /// Market the content is aimed at, e.g. "lao". Compared exactly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_market: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageContext {
    pub fn for_market(market: impl Into<String>) -> Self {
        Self {
            target_market: Some(market.into()),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub action: String,
    pub data: MessageData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
}

/// A message from one agent to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterAgentMessage {
    pub message_id: MessageId,
    pub timestamp: DateTime<Utc>,
    pub from_agent: AgentId,
    pub to_agent: AgentId,
    pub message_type: MessageType,
    pub priority: Priority,
    pub payload: MessagePayload,
    /// True when the action touches a sensitive category.
    pub ethics_check: bool,
    /// True when a human must sign off before the action is carried out.
    pub requires_human_approval: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_messages: Vec<MessageId>,
    /// Time to live, in seconds.
    pub ttl: Option<u64>,
}
