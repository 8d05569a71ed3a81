//! The four canonical NEXUS workflow templates and their default bindings.
//!
//! | Event                          | Template             | Coordinator |
//! |--------------------------------|----------------------|-------------|
//! | `lead.discovered`              | `lead-to-outreach`   | agent-016   |
//! | `stress.detected`              | `stress-to-healing`  | agent-001   |
//! | `strategic.planning.requested` | `strategic-planning` | agent-001   |
//! | `content.creation.requested`   | `content-creation`   | agent-013   |

use nexus_contracts::{
    agent::AgentId,
    error::NexusResult,
    event::{event_types, ContentType, Event, EventPayload},
    workflow::{StepSpec, WorkflowSpec},
};
use nexus_core::{template::EventBinding, traits::WorkflowTemplate, TemplateRegistry};

pub const LEAD_TO_OUTREACH: &str = "lead-to-outreach";
pub const STRESS_TO_HEALING: &str = "stress-to-healing";
pub const STRATEGIC_PLANNING: &str = "strategic-planning";
pub const CONTENT_CREATION: &str = "content-creation";

/// Step 6 of the healing protocol is signed off by this human, not an agent.
pub const HUMAN_APPROVER: &str = "human-laurent";

/// Sales: log the lead, notify the director, draft, review, and send.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadToOutreach;

impl WorkflowTemplate for LeadToOutreach {
    fn name(&self) -> &str {
        LEAD_TO_OUTREACH
    }

    fn instantiate(&self, _event: &Event) -> NexusResult<WorkflowSpec> {
        Ok(WorkflowSpec {
            name: "Lead to Outreach".to_string(),
            description: "Process new lead from discovery to initial outreach".to_string(),
            coordinator: Some(AgentId::from("agent-016")),
            steps: vec![
                StepSpec::new(1, "Log lead in CRM", "agent-022").after("event:lead.discovered"),
                StepSpec::new(2, "Notify Sales Director", "agent-016").after("step:1:complete"),
                StepSpec::new(3, "Draft initial outreach", "agent-013").after("step:2:complete"),
                StepSpec::new(4, "Validate tone and voice", "agent-014").after("step:3:complete"),
                StepSpec::new(5, "Ethics check", "agent-004").after("step:4:complete"),
                StepSpec::new(6, "Send communication", "agent-013").after("step:5:approved"),
            ],
        })
    }
}

/// Healing: alert Alex, fan out to three specialists, synthesise, and
/// deliver once a human has approved.
#[derive(Debug, Clone, Copy, Default)]
pub struct StressToHealing;

impl WorkflowTemplate for StressToHealing {
    fn name(&self) -> &str {
        STRESS_TO_HEALING
    }

    fn instantiate(&self, _event: &Event) -> NexusResult<WorkflowSpec> {
        Ok(WorkflowSpec {
            name: "Stress to Healing Protocol".to_string(),
            description: "Detect stress and deliver integrated healing protocol".to_string(),
            coordinator: Some(AgentId::from("agent-001")),
            steps: vec![
                StepSpec::new(1, "Alert Alex", "agent-001").after("event:stress.detected"),
                StepSpec::new(2, "Generate somatic protocol", "agent-008").after("parallel:1"),
                StepSpec::new(3, "Check spiritual correlations", "agent-030").after("parallel:1"),
                StepSpec::new(4, "Check lunar alignment", "agent-015").after("parallel:1"),
                StepSpec::new(5, "Synthesize protocol", "agent-001").after("step:2,3,4:complete"),
                StepSpec::new(6, "Request human approval", HUMAN_APPROVER).after("step:5:complete"),
                StepSpec::new(7, "Deliver protocol", "agent-006").after("step:6:approved"),
            ],
        })
    }
}

/// Strategy: roadmap first, four parallel reviews, then a synthesis.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategicPlanning;

impl StrategicPlanning {
    /// The planning workflow for `goal`, independent of any event.
    pub fn for_goal(goal: &str) -> WorkflowSpec {
        WorkflowSpec {
            name: "Strategic Planning".to_string(),
            description: format!("Strategic planning for: {}", goal),
            coordinator: Some(AgentId::from("agent-001")),
            steps: vec![
                StepSpec::new(1, "Create strategic roadmap", "agent-024"),
                StepSpec::new(2, "Market research", "agent-026").after("parallel:1"),
                StepSpec::new(3, "Assess localization", "agent-062").after("parallel:1"),
                StepSpec::new(4, "Financial feasibility", "agent-027").after("parallel:1"),
                StepSpec::new(5, "Compliance review", "agent-044").after("parallel:1"),
                StepSpec::new(6, "Synthesize plan", "agent-001").after("step:1,2,3,4,5:complete"),
            ],
        }
    }
}

impl WorkflowTemplate for StrategicPlanning {
    fn name(&self) -> &str {
        STRATEGIC_PLANNING
    }

    fn instantiate(&self, event: &Event) -> NexusResult<WorkflowSpec> {
        let goal = match &event.payload {
            EventPayload::StrategicPlanning { goal, .. } => goal.as_str(),
            EventPayload::Data { fields } => fields
                .get("goal")
                .and_then(|v| v.as_str())
                .unwrap_or("unspecified goal"),
            _ => "unspecified goal",
        };
        Ok(Self::for_goal(goal))
    }
}

/// Content: generate, optimise, calibrate, review, schedule, publish.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentCreation;

impl WorkflowTemplate for ContentCreation {
    fn name(&self) -> &str {
        CONTENT_CREATION
    }

    fn instantiate(&self, event: &Event) -> NexusResult<WorkflowSpec> {
        let visual = match &event.payload {
            EventPayload::ContentCreation { content_type, .. } => *content_type == ContentType::Visual,
            EventPayload::Data { fields } => fields
                .get("contentType")
                .or_else(|| fields.get("content_type"))
                .and_then(|v| v.as_str())
                == Some("visual"),
            _ => false,
        };
        let creator = if visual { "agent-011" } else { "agent-010" };
        Ok(WorkflowSpec {
            name: "Content Creation & Publishing".to_string(),
            description: "Create and publish content across channels".to_string(),
            coordinator: Some(AgentId::from("agent-013")),
            steps: vec![
                StepSpec::new(1, "Generate content", creator),
                StepSpec::new(2, "Optimize for SEO", "agent-037").after("step:1:complete"),
                StepSpec::new(3, "Tone calibration", "agent-014").after("step:2:complete"),
                StepSpec::new(4, "Ethics check", "agent-004").after("step:3:complete"),
                StepSpec::new(5, "Schedule posting", "agent-015").after("step:4:approved"),
                StepSpec::new(6, "Publish content", "agent-013").after("step:5:complete"),
            ],
        })
    }
}

/// A registry holding all four templates.
pub fn builtin_registry() -> TemplateRegistry {
    let mut registry = TemplateRegistry::new();
    registry.register(LeadToOutreach);
    registry.register(StressToHealing);
    registry.register(StrategicPlanning);
    registry.register(ContentCreation);
    registry
}

/// The event → template table used when the configuration names none.
pub fn default_bindings() -> Vec<EventBinding> {
    vec![
        EventBinding::new(event_types::LEAD_DISCOVERED, LEAD_TO_OUTREACH),
        EventBinding::new(event_types::STRESS_DETECTED, STRESS_TO_HEALING),
        EventBinding::new(event_types::STRATEGIC_PLANNING_REQUESTED, STRATEGIC_PLANNING),
        EventBinding::new(event_types::CONTENT_CREATION_REQUESTED, CONTENT_CREATION),
    ]
}
