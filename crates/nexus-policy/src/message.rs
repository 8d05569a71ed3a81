//! Inter-agent message and event construction.
//!
//! `MessageBuilder` stamps each message with a fresh id, the current time,
//! and the two advisory flags derived from its `MessagePolicy`. It does not
//! enforce anything; callers run the ethics validator separately.

use chrono::Utc;
use tracing::debug;

use nexus_contracts::{
    agent::AgentId,
    event::{Event, EventPayload},
    message::{
        InterAgentMessage, MessageContext, MessageData, MessageId, MessagePayload, MessageType,
        Priority,
    },
};

use crate::rule::MessagePolicy;

#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    policy: MessagePolicy,
}

impl MessageBuilder {
    pub fn new(policy: MessagePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MessagePolicy {
        &self.policy
    }

    /// Build a message from `from` to `to`.
    pub fn create_message(
        &self,
        from: AgentId,
        to: AgentId,
        action: &str,
        data: MessageData,
        message_type: MessageType,
        priority: Priority,
    ) -> InterAgentMessage {
        let ethics_check = self.requires_ethics_check(action);
        let requires_human_approval = self.requires_human_approval(action, &data, priority);

        debug!(
            from_agent = %from,
            to_agent = %to,
            action = %action,
            ethics_check,
            requires_human_approval,
            "message created"
        );

        InterAgentMessage {
            message_id: MessageId::new(),
            timestamp: Utc::now(),
            from_agent: from,
            to_agent: to,
            message_type,
            priority,
            payload: MessagePayload {
                action: action.to_string(),
                data,
                context: None,
            },
            ethics_check,
            requires_human_approval,
            related_messages: Vec::new(),
            ttl: Some(self.policy.default_ttl_secs),
        }
    }

    /// A `Request` at `Medium` priority.
    pub fn request(&self, from: AgentId, to: AgentId, action: &str, data: MessageData) -> InterAgentMessage {
        self.create_message(from, to, action, data, MessageType::Request, Priority::Medium)
    }

    /// As `request`, carrying a scan context for later validation.
    pub fn request_with_context(
        &self,
        from: AgentId,
        to: AgentId,
        action: &str,
        data: MessageData,
        context: MessageContext,
    ) -> InterAgentMessage {
        let mut message = self.request(from, to, action, data);
        message.payload.context = Some(context);
        message
    }

    /// Build an event with a fresh id and timestamp. No validation.
    pub fn create_event(
        &self,
        event_type: impl Into<String>,
        publisher: impl Into<String>,
        payload: EventPayload,
        subscribers: Vec<String>,
    ) -> Event {
        let mut event = Event::new(event_type, publisher, payload);
        event.subscribers = subscribers;
        event
    }

    fn requires_ethics_check(&self, action: &str) -> bool {
        let action = action.to_lowercase();
        contains_any(&action, &self.policy.ethics_keywords)
    }

    /// Approval keywords and the severity are matched exactly as written;
    /// only the ethics keywords ignore case.
    fn requires_human_approval(&self, action: &str, data: &MessageData, priority: Priority) -> bool {
        if priority == Priority::Critical {
            return true;
        }
        if data
            .amount
            .is_some_and(|amount| amount > self.policy.approval_amount_threshold)
        {
            return true;
        }

        if mentions_any(action, &self.policy.legal_keywords) {
            return true;
        }

        let acute = data.severity.as_deref() == Some(self.policy.acute_severity.as_str());
        if acute && action.contains(self.policy.acute_care_keyword.as_str()) {
            return true;
        }

        !self.policy.pivot_keywords.is_empty()
            && self
                .policy
                .pivot_keywords
                .iter()
                .all(|k| action.contains(k.as_str()))
    }
}

fn contains_any(haystack_lower: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|k| !k.is_empty() && haystack_lower.contains(&k.to_lowercase()))
}

fn mentions_any(action: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| !k.is_empty() && action.contains(k.as_str()))
}
