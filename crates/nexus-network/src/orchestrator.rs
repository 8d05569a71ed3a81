//! The orchestration facade: routing, message construction, validation, and
//! health reporting behind one service.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use nexus_contracts::{
    agent::AgentId,
    error::NexusResult,
    message::{InterAgentMessage, MessageContext, MessageData},
    workflow::Workflow,
};
use nexus_core::WorkflowEngine;
use nexus_monitor::PerformanceMonitor;
use nexus_policy::{EthicsValidator, MessageBuilder};
use nexus_router::AgentRouter;

use crate::templates::StrategicPlanning;

/// More routed agents than this turns a task into a planning workflow.
const PLANNING_AGENT_THRESHOLD: usize = 3;

/// What `route_task` produced for one task.
#[derive(Debug, Clone)]
pub struct RoutedTask {
    pub agents: Vec<AgentId>,
    /// One request per routed agent, from the overseer.
    pub messages: Vec<InterAgentMessage>,
    /// A pending strategic-planning workflow for broad or planning tasks.
    pub workflow: Option<Workflow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub bottleneck_alerts: Vec<String>,
    pub total_active_workflows: usize,
}

pub struct OrchestrationService {
    router: AgentRouter,
    builder: MessageBuilder,
    validator: EthicsValidator,
    monitor: PerformanceMonitor,
    engine: Arc<WorkflowEngine>,
}

impl OrchestrationService {
    pub fn new(
        router: AgentRouter,
        builder: MessageBuilder,
        validator: EthicsValidator,
        monitor: PerformanceMonitor,
        engine: Arc<WorkflowEngine>,
    ) -> Self {
        Self {
            router,
            builder,
            validator,
            monitor,
            engine,
        }
    }

    pub fn router(&self) -> &AgentRouter {
        &self.router
    }

    pub fn builder(&self) -> &MessageBuilder {
        &self.builder
    }

    pub fn validator(&self) -> &EthicsValidator {
        &self.validator
    }

    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    pub fn engine(&self) -> &Arc<WorkflowEngine> {
        &self.engine
    }

    /// The agent every routed request is sent from.
    pub fn overseer(&self) -> &AgentId {
        &self.router.table().default_agent
    }

    /// Route `task`, address one request to each chosen agent, and create
    /// (but do not run) a strategic-planning workflow when the task is broad
    /// or mentions planning.
    ///
    /// `context`, when it is a JSON object, becomes each message's data; a
    /// `targetMarket` field in it also becomes the messages' scan context.
    pub fn route_task(&self, task: &str, context: Option<&Value>) -> NexusResult<RoutedTask> {
        let agents = self.router.route(task, context);
        let (data, scan_context) = message_parts(context);

        let messages: Vec<InterAgentMessage> = agents
            .iter()
            .map(|agent| match &scan_context {
                Some(ctx) => self.builder.request_with_context(
                    self.overseer().clone(),
                    agent.clone(),
                    task,
                    data.clone(),
                    ctx.clone(),
                ),
                None => self
                    .builder
                    .request(self.overseer().clone(), agent.clone(), task, data.clone()),
            })
            .collect();

        let workflow = if agents.len() > PLANNING_AGENT_THRESHOLD || task.to_lowercase().contains("plan") {
            let workflow = self.engine.create_workflow(StrategicPlanning::for_goal(task))?;
            info!(workflow_id = %workflow.workflow_id, "planning workflow created for routed task");
            Some(workflow)
        } else {
            None
        };

        debug!(
            agents = agents.len(),
            messages = messages.len(),
            workflow = workflow.is_some(),
            "task routed"
        );
        Ok(RoutedTask {
            agents,
            messages,
            workflow,
        })
    }

    /// `true` unless the message is flagged for an ethics check and its
    /// serialized data fails the scan.
    pub fn validate_message(&self, message: &InterAgentMessage) -> bool {
        if !message.ethics_check {
            return true;
        }
        let content = serde_json::to_string(&message.payload.data).unwrap_or_default();
        let context = message.payload.context.clone().unwrap_or_default();
        let report = self.validator.scan_content(&content, &context);
        if !report.passed {
            info!(
                message_id = %message.message_id.0,
                to_agent = %message.to_agent,
                severity = ?report.severity,
                "message failed ethics validation"
            );
        }
        report.passed
    }

    pub fn track_performance(&self, agent_id: &AgentId, response_time_ms: f64, success: bool) {
        self.monitor.track_message(agent_id, response_time_ms, success);
    }

    pub fn system_health(&self) -> SystemHealth {
        SystemHealth {
            bottleneck_alerts: self.monitor.bottleneck_alerts(),
            total_active_workflows: self.engine.active_workflows().len(),
        }
    }
}

fn message_parts(context: Option<&Value>) -> (MessageData, Option<MessageContext>) {
    let Some(value) = context else {
        return (MessageData::default(), None);
    };
    let Value::Object(fields) = value else {
        return (MessageData::default(), None);
    };
    let data = serde_json::from_value(value.clone()).unwrap_or_else(|_| MessageData {
        extra: fields.clone(),
        ..MessageData::default()
    });
    let scan_context = serde_json::from_value::<MessageContext>(value.clone())
        .ok()
        .filter(|ctx| ctx.target_market.is_some());
    (data, scan_context)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use nexus_contracts::{
        agent::AgentId,
        message::{MessageContext, MessageData, MessageType, Priority},
        workflow::WorkflowStatus,
    };
    use nexus_core::{config::EngineConfig, EventBus, WorkflowEngine};
    use nexus_monitor::PerformanceMonitor;
    use nexus_policy::{EthicsValidator, MessageBuilder};
    use nexus_router::AgentRouter;

    use super::OrchestrationService;

    fn service() -> OrchestrationService {
        OrchestrationService::new(
            AgentRouter::builtin().unwrap(),
            MessageBuilder::default(),
            EthicsValidator::builtin().unwrap(),
            PerformanceMonitor::default(),
            WorkflowEngine::simulated(EventBus::new(), EngineConfig::immediate()),
        )
    }

    fn ids(agents: &[AgentId]) -> Vec<&str> {
        agents.iter().map(AgentId::as_str).collect()
    }

    #[test]
    fn routed_task_gets_one_request_per_agent() {
        let svc = service();
        let routed = svc.route_task("Draft sales outreach for the new lead", None).unwrap();

        assert_eq!(ids(&routed.agents), vec!["agent-017", "agent-004"]);
        assert_eq!(routed.messages.len(), 2);
        for (msg, agent) in routed.messages.iter().zip(&routed.agents) {
            assert_eq!(msg.from_agent.as_str(), "agent-001");
            assert_eq!(&msg.to_agent, agent);
            assert_eq!(msg.message_type, MessageType::Request);
            assert_eq!(msg.priority, Priority::Medium);
            assert_eq!(msg.payload.action, "Draft sales outreach for the new lead");
            assert!(msg.ethics_check);
        }
        assert!(routed.workflow.is_none());
    }

    #[test]
    fn broad_task_creates_pending_planning_workflow() {
        let svc = service();
        let routed = svc.route_task("Expand to the Lao market with new pricing", None).unwrap();

        assert!(routed.agents.len() > 3, "{:?}", routed.agents);
        let workflow = routed.workflow.expect("planning workflow");
        assert_eq!(workflow.status, WorkflowStatus::Pending);
        assert_eq!(
            workflow.description,
            "Strategic planning for: Expand to the Lao market with new pricing"
        );
        assert_eq!(svc.engine().workflow_count(), 1);
        assert_eq!(svc.system_health().total_active_workflows, 1);
    }

    #[test]
    fn planning_keyword_alone_creates_workflow() {
        let svc = service();
        let routed = svc.route_task("PLAN next quarter", None).unwrap();
        assert_eq!(ids(&routed.agents), vec!["agent-024"]);
        assert!(routed.workflow.is_some());
    }

    #[test]
    fn context_becomes_data_and_scan_context() {
        let svc = service();
        let context = json!({ "amount": 2500.0, "targetMarket": "lao", "channel": "email" });
        let routed = svc.route_task("Send pricing offer", Some(&context)).unwrap();

        let msg = &routed.messages[0];
        assert_eq!(msg.payload.data.amount, Some(2500.0));
        assert!(msg.requires_human_approval);
        assert_eq!(
            msg.payload.context.as_ref().and_then(|c| c.target_market.as_deref()),
            Some("lao")
        );
    }

    #[test]
    fn unflagged_messages_always_validate() {
        let svc = service();
        let msg = svc.builder().request(
            AgentId::from("agent-001"),
            AgentId::from("agent-026"),
            "Summarise competitor report",
            MessageData::default().with_field("note", json!("act now or lose everything")),
        );
        assert!(!msg.ethics_check);
        assert!(svc.validate_message(&msg));
    }

    #[test]
    fn flagged_message_is_scanned_on_its_data() {
        let svc = service();
        let msg = svc.builder().request(
            AgentId::from("agent-001"),
            AgentId::from("agent-013"),
            "Prepare outreach email",
            MessageData::default().with_field("body", json!("Limited time only: book today")),
        );
        assert!(msg.ethics_check);
        assert!(!svc.validate_message(&msg));
    }

    #[test]
    fn market_checks_follow_message_context() {
        let svc = service();
        let data = MessageData::default().with_field("body", json!("Bringing light to primitive villages"));
        let plain = svc.builder().request(
            AgentId::from("agent-001"),
            AgentId::from("agent-013"),
            "Spiritual retreat outreach",
            data.clone(),
        );
        let lao = svc.builder().request_with_context(
            AgentId::from("agent-001"),
            AgentId::from("agent-013"),
            "Spiritual retreat outreach",
            data,
            MessageContext::for_market("lao"),
        );
        assert!(svc.validate_message(&plain));
        assert!(!svc.validate_message(&lao));
    }

    #[test]
    fn health_reports_bottlenecks() {
        let svc = service();
        svc.track_performance(&AgentId::from("agent-004"), 6200.0, true);
        svc.track_performance(&AgentId::from("agent-030"), 9000.0, true);
        let health = svc.system_health();
        assert_eq!(health.bottleneck_alerts, vec!["agent-004 experiencing high latency: 6200ms"]);
        assert_eq!(health.total_active_workflows, 0);
    }

    #[test]
    fn services_share_engine_and_monitor() {
        let engine = WorkflowEngine::simulated(EventBus::new(), EngineConfig::immediate());
        let monitor = PerformanceMonitor::default();
        let svc = OrchestrationService::new(
            AgentRouter::builtin().unwrap(),
            MessageBuilder::default(),
            EthicsValidator::builtin().unwrap(),
            monitor.clone(),
            Arc::clone(&engine),
        );
        svc.track_performance(&AgentId::from("agent-001"), 10.0, false);
        assert_eq!(monitor.agent_metrics(&AgentId::from("agent-001")).unwrap().total_messages, 1);
        svc.route_task("strategy plan", None).unwrap();
        assert_eq!(engine.workflow_count(), 1);
    }
}
