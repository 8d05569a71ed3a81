//! The static NEXUS roster: twelve departments and sixty-eight agents.
//!
//! All records here are fictional reference data, loaded once at startup by
//! `AgentRegistry::builtin`.

use nexus_contracts::{
    agent::{Agent, AgentId, AgentStatus, AuthorityLevel, Department, DepartmentId},
    message::Priority,
};

use nexus_contracts::agent::AuthorityLevel::{Advisory, Autonomous, Execution};
use nexus_contracts::message::Priority::{Critical, High, Low, Medium};

/// Model identifier stamped on every agent.
pub const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash";

// ── Departments ───────────────────────────────────────────────────────────────

/// (id, name, declared agent count, description)
const DEPARTMENTS: &[(&str, &str, u32, &str)] = &[
    ("dept-01", "Executive Command", 5, "Overall coordination, memory of the mission, and evolution tracking"),
    ("dept-02", "Ethics & Governance", 4, "Aegis protocol, bias audits, and transparency"),
    ("dept-03", "Healing & Wellness", 6, "Somatic, nervous-system, and lifestyle protocols"),
    ("dept-04", "Cultural Bridge", 5, "Lao market liaison, language, and community relations"),
    ("dept-05", "Sales & Revenue", 8, "Lead discovery through to closed accounts"),
    ("dept-06", "Creative & Content", 9, "Written, visual, audio, and video content"),
    ("dept-07", "Communications", 3, "Outreach, voice, and scheduling"),
    ("dept-08", "Strategy & Research", 6, "Roadmaps, market scanning, and forecasting"),
    ("dept-09", "Infrastructure & Integration", 9, "APIs, automation, data, and uptime"),
    ("dept-10", "Finance", 5, "Budgets, pricing, and treasury"),
    ("dept-11", "Spiritual Intelligence", 4, "Synchronicity, ritual, and lunar cycles"),
    ("dept-12", "Legal & Compliance", 4, "Contracts, privacy, and regulatory review"),
];

// ── Agents ────────────────────────────────────────────────────────────────────

struct Seed {
    id: &'static str,
    name: &'static str,
    role: &'static str,
    department: &'static str,
    authority: AuthorityLevel,
    priority: Priority,
    inputs: &'static [&'static str],
    outputs: &'static [&'static str],
}

#[allow(clippy::too_many_arguments)]
const fn seed(
    id: &'static str,
    name: &'static str,
    role: &'static str,
    department: &'static str,
    authority: AuthorityLevel,
    priority: Priority,
    inputs: &'static [&'static str],
    outputs: &'static [&'static str],
) -> Seed {
    Seed { id, name, role, department, authority, priority, inputs, outputs }
}

#[rustfmt::skip]
const AGENTS: &[Seed] = &[
    seed("agent-001", "Alex", "Chief Intelligence Overseer", "dept-01", Autonomous, Critical, &["all-channels"], &["directives", "strategy"]),
    seed("agent-002", "Chronicle", "Mission Memory Keeper", "dept-01", Advisory, High, &["events"], &["mission-log"]),
    seed("agent-003", "Conductor", "Operations Coordinator", "dept-01", Execution, High, &["directives"], &["task-assignments"]),
    seed("agent-004", "Aegis", "Ethics Guardian", "dept-02", Autonomous, Critical, &["messages", "content"], &["ethics-verdicts"]),
    seed("agent-005", "Sentinel", "Risk Watcher", "dept-02", Advisory, High, &["events"], &["risk-alerts"]),
    seed("agent-006", "Healer", "Healing Protocol Lead", "dept-03", Execution, High, &["stress-signals"], &["healing-protocols"]),
    seed("agent-007", "Breathwork Guide", "Breathwork Specialist", "dept-03", Execution, Medium, &["healing-protocols"], &["breath-sessions"]),
    seed("agent-008", "Nervous System", "Somatic Regulation Specialist", "dept-03", Execution, High, &["stress-signals"], &["somatic-protocols"]),
    seed("agent-009", "Lao Market Liaison", "Lao Market Specialist", "dept-04", Advisory, Medium, &["market-briefs"], &["localization-notes"]),
    seed("agent-010", "Creator", "Content Writer", "dept-06", Execution, Medium, &["content-briefs"], &["drafts"]),
    seed("agent-011", "Visual", "Visual Designer", "dept-06", Execution, Medium, &["content-briefs"], &["images"]),
    seed("agent-012", "Resonance", "Audio Producer", "dept-06", Execution, Low, &["content-briefs"], &["audio"]),
    seed("agent-013", "Messenger", "Outreach & Publishing Lead", "dept-07", Execution, High, &["drafts"], &["communications"]),
    seed("agent-014", "Voice Keeper", "Tone & Voice Calibrator", "dept-07", Advisory, Medium, &["drafts"], &["tone-reviews"]),
    seed("agent-015", "Timekeeper", "Scheduling & Lunar Timing", "dept-07", Execution, Medium, &["calendars"], &["schedules"]),
    seed("agent-016", "Sales Director", "Sales Department Hub", "dept-05", Autonomous, High, &["leads"], &["sales-directives"]),
    seed("agent-017", "Lead Discovery", "Lead Prospector", "dept-05", Execution, High, &["market-signals"], &["leads"]),
    seed("agent-018", "Lead Nurturing", "Nurture Sequencer", "dept-05", Execution, Medium, &["leads"], &["nurture-sequences"]),
    seed("agent-019", "Closer", "Deal Closer", "dept-05", Execution, High, &["qualified-leads"], &["deals"]),
    seed("agent-020", "Partnership Scout", "Partnership Developer", "dept-05", Advisory, Medium, &["market-signals"], &["partner-briefs"]),
    seed("agent-021", "Account Manager", "Client Success", "dept-05", Execution, Medium, &["deals"], &["renewals"]),
    seed("agent-022", "CRM Keeper", "CRM Administrator", "dept-05", Execution, Medium, &["leads", "deals"], &["crm-records"]),
    seed("agent-023", "Referral Tracker", "Referral Programme Analyst", "dept-05", Advisory, Low, &["crm-records"], &["referral-reports"]),
    seed("agent-024", "Architect", "Strategic Roadmap Designer", "dept-08", Autonomous, High, &["goals"], &["roadmaps"]),
    seed("agent-025", "Visionary", "Long-range Futurist", "dept-08", Advisory, Medium, &["roadmaps"], &["scenarios"]),
    seed("agent-026", "Market Scanner", "Market & Competitor Analyst", "dept-08", Execution, Medium, &["market-signals"], &["market-briefs"]),
    seed("agent-027", "Finance", "Financial Analyst", "dept-10", Advisory, High, &["budgets"], &["feasibility-reports"]),
    seed("agent-028", "Pricing", "Pricing Strategist", "dept-10", Advisory, Medium, &["market-briefs"], &["price-models"]),
    seed("agent-029", "Trend Forecaster", "Trend Analyst", "dept-08", Advisory, Low, &["market-signals"], &["forecasts"]),
    seed("agent-030", "Sync Decoder", "Synchronicity Interpreter", "dept-11", Advisory, Medium, &["events"], &["spiritual-correlations"]),
    seed("agent-031", "Bookkeeper", "Ledger Keeper", "dept-10", Execution, Medium, &["transactions"], &["ledgers"]),
    seed("agent-032", "Forecaster", "Revenue Forecaster", "dept-10", Advisory, Medium, &["ledgers"], &["revenue-forecasts"]),
    seed("agent-033", "Treasury", "Cash Flow Steward", "dept-10", Execution, Medium, &["ledgers"], &["cash-reports"]),
    seed("agent-034", "Ritual Designer", "Ceremony Designer", "dept-11", Execution, Low, &["spiritual-correlations"], &["rituals"]),
    seed("agent-035", "Lunar Reader", "Lunar Cycle Analyst", "dept-11", Advisory, Low, &["calendars"], &["lunar-windows"]),
    seed("agent-036", "Dream Interpreter", "Symbolic Analyst", "dept-11", Advisory, Low, &["journals"], &["interpretations"]),
    seed("agent-037", "SEO Optimizer", "Search Optimisation Specialist", "dept-06", Execution, Medium, &["drafts"], &["optimized-drafts"]),
    seed("agent-038", "Copywriter", "Short-form Copywriter", "dept-06", Execution, Medium, &["content-briefs"], &["copy"]),
    seed("agent-039", "Lens", "Video Producer", "dept-06", Execution, Low, &["content-briefs"], &["video"]),
    seed("agent-040", "Brand Steward", "Brand Consistency Reviewer", "dept-06", Advisory, Medium, &["drafts", "images"], &["brand-reviews"]),
    seed("agent-041", "Social Weaver", "Social Media Manager", "dept-06", Execution, Medium, &["optimized-drafts"], &["posts"]),
    seed("agent-042", "Newsletter Editor", "Newsletter Editor", "dept-06", Execution, Low, &["drafts"], &["newsletters"]),
    seed("agent-043", "Protector", "Legal Risk Counsel", "dept-12", Advisory, High, &["contracts"], &["legal-opinions"]),
    seed("agent-044", "Compliance", "Compliance Department Hub", "dept-12", Autonomous, High, &["plans", "contracts"], &["compliance-reviews"]),
    seed("agent-045", "Privacy Officer", "Data Privacy Officer", "dept-12", Advisory, High, &["data-flows"], &["privacy-reviews"]),
    seed("agent-046", "Contract Drafter", "Contract Specialist", "dept-12", Execution, Medium, &["deals"], &["contracts"]),
    seed("agent-047", "Data Analyst", "Quantitative Analyst", "dept-08", Execution, Medium, &["crm-records", "ledgers"], &["dashboards"]),
    seed("agent-048", "Insight Miner", "Qualitative Researcher", "dept-08", Advisory, Low, &["feedback"], &["insights"]),
    seed("agent-049", "Data Steward", "Data Quality Engineer", "dept-09", Execution, Medium, &["data-flows"], &["clean-data"]),
    seed("agent-050", "Security Warden", "Security Engineer", "dept-09", Autonomous, High, &["access-logs"], &["security-alerts"]),
    seed("agent-051", "Automator", "Automation Engineer", "dept-09", Execution, Medium, &["workflows"], &["automations"]),
    seed("agent-052", "Workflow Mechanic", "Workflow Maintainer", "dept-09", Execution, Medium, &["workflows"], &["workflow-fixes"]),
    seed("agent-053", "Librarian", "Knowledge Base Curator", "dept-09", Execution, Low, &["documents"], &["knowledge-base"]),
    seed("agent-054", "Uptime Guardian", "Reliability Engineer", "dept-09", Autonomous, High, &["health-checks"], &["incident-reports"]),
    seed("agent-055", "API Synchronizer", "Integration Department Hub", "dept-09", Autonomous, Critical, &["api-events"], &["sync-jobs"]),
    seed("agent-056", "Integration Broker", "Third-party Integrations", "dept-09", Execution, Medium, &["sync-jobs"], &["integrations"]),
    seed("agent-057", "Relay", "Notification Relay", "dept-09", Execution, Low, &["events"], &["notifications"]),
    seed("agent-058", "Nourish", "Nutrition Guide", "dept-03", Advisory, Low, &["healing-protocols"], &["meal-plans"]),
    seed("agent-059", "Restorer", "Sleep Coach", "dept-03", Advisory, Low, &["healing-protocols"], &["sleep-plans"]),
    seed("agent-060", "Mover", "Movement Therapist", "dept-03", Advisory, Low, &["healing-protocols"], &["movement-plans"]),
    seed("agent-061", "Cultural Advisor", "Cultural Sensitivity Reviewer", "dept-04", Advisory, Medium, &["drafts"], &["cultural-reviews"]),
    seed("agent-062", "Lao Language Expert", "Lao Translator & Localizer", "dept-04", Execution, Medium, &["drafts", "plans"], &["localized-content"]),
    seed("agent-063", "Translator", "Multilingual Translator", "dept-04", Execution, Low, &["drafts"], &["translations"]),
    seed("agent-064", "Community Liaison", "Community Relations", "dept-04", Execution, Low, &["events"], &["community-updates"]),
    seed("agent-065", "Human Liaison", "Human Approval Coordinator", "dept-01", Execution, High, &["approval-requests"], &["approvals"]),
    seed("agent-066", "Evolution Tracker", "System Growth Analyst", "dept-01", Advisory, Medium, &["metrics"], &["evolution-reports"]),
    seed("agent-067", "Bias Auditor", "Bias & Fairness Auditor", "dept-02", Advisory, Medium, &["content"], &["bias-reports"]),
    seed("agent-068", "Transparency Officer", "Disclosure Reviewer", "dept-02", Advisory, Medium, &["communications"], &["disclosures"]),
];

/// Build the department records.
pub fn departments() -> Vec<Department> {
    DEPARTMENTS
        .iter()
        .map(|&(id, name, agent_count, description)| Department {
            id: DepartmentId::new(id),
            name: name.to_string(),
            agent_count,
            description: description.to_string(),
        })
        .collect()
}

/// Build the agent records, every one `Idle` and active.
///
/// Alignment scores are spread over 90–99 deterministically by position.
pub fn agents() -> Vec<Agent> {
    AGENTS
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let department = DEPARTMENTS
                .iter()
                .find(|d| d.0 == s.department)
                .map_or(s.department, |d| d.1);
            Agent {
                id: AgentId::new(s.id),
                name: s.name.to_string(),
                role: s.role.to_string(),
                department: department.to_string(),
                department_id: DepartmentId::new(s.department),
                status: AgentStatus::Idle,
                authority: s.authority,
                current_task: None,
                alignment_score: 90 + ((i * 7) % 10) as u8,
                inputs: s.inputs.iter().map(|x| x.to_string()).collect(),
                outputs: s.outputs.iter().map(|x| x.to_string()).collect(),
                description: format!("{}, {} in {}", s.name, s.role, department),
                integrations: Vec::new(),
                priority: s.priority,
                llm_model: DEFAULT_LLM_MODEL.to_string(),
                active: true,
            }
        })
        .collect()
}
