//! The live agent registry.
//!
//! Agents are created once and mutated in place (status, current task,
//! alignment score); departments are read-only. Construction rejects any
//! agent whose `department_id` does not resolve.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::Serialize;
use tracing::{debug, info};

use nexus_contracts::{
    agent::{Agent, AgentId, AgentStatus, Department},
    error::{NexusError, NexusResult},
    event::{event_types, Event, EventPayload},
};
use nexus_core::{EventBus, Subscription};

use crate::roster;

/// Aggregate view used by dashboards and the chat front.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    pub total_agents: usize,
    pub working_agents: usize,
    /// Mean alignment score, 0–100.
    pub overall_alignment: f64,
}

#[derive(Clone)]
pub struct AgentRegistry {
    departments: Arc<Vec<Department>>,
    agents: Arc<Mutex<BTreeMap<AgentId, Agent>>>,
    /// Step labels each agent is currently running, oldest first.
    running: Arc<Mutex<HashMap<AgentId, Vec<String>>>>,
}

impl AgentRegistry {
    /// Build a registry, checking every agent's department exists and no id
    /// is used twice.
    pub fn new(departments: Vec<Department>, agents: Vec<Agent>) -> NexusResult<Self> {
        let known: HashSet<&str> = departments.iter().map(|d| d.id.as_str()).collect();

        let mut table = BTreeMap::new();
        for agent in agents {
            if !known.contains(agent.department_id.as_str()) {
                return Err(NexusError::UnknownDepartment {
                    agent_id: agent.id.to_string(),
                    department_id: agent.department_id.to_string(),
                });
            }
            if table.contains_key(&agent.id) {
                return Err(NexusError::ConfigError {
                    reason: format!("agent id '{}' is registered twice", agent.id),
                });
            }
            table.insert(agent.id.clone(), agent);
        }

        info!(
            departments = departments.len(),
            agents = table.len(),
            "agent registry loaded"
        );

        Ok(Self {
            departments: Arc::new(departments),
            agents: Arc::new(Mutex::new(table)),
            running: Arc::default(),
        })
    }

    /// The built-in roster of twelve departments and sixty-eight agents.
    pub fn builtin() -> NexusResult<Self> {
        Self::new(roster::departments(), roster::agents())
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<AgentId, Agent>> {
        self.agents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    pub fn department(&self, id: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.id.as_str() == id)
    }

    pub fn agent(&self, id: &AgentId) -> Option<Agent> {
        self.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.lock().contains_key(id)
    }

    /// Every agent, sorted by id.
    pub fn agents(&self) -> Vec<Agent> {
        self.lock().values().cloned().collect()
    }

    pub fn department_agents(&self, department_id: &str) -> Vec<Agent> {
        self.lock()
            .values()
            .filter(|a| a.department_id.as_str() == department_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn update<T>(&self, id: &AgentId, f: impl FnOnce(&mut Agent) -> T) -> NexusResult<T> {
        let mut agents = self.lock();
        let agent = agents.get_mut(id).ok_or_else(|| NexusError::UnknownAgent {
            agent_id: id.to_string(),
        })?;
        Ok(f(agent))
    }

    pub fn set_status(&self, id: &AgentId, status: AgentStatus, task: Option<String>) -> NexusResult<()> {
        self.update(id, |agent| {
            agent.status = status;
            agent.current_task = task;
        })?;
        debug!(agent_id = %id, status = ?status, "agent status changed");
        Ok(())
    }

    /// Shift an agent's alignment score by `delta`, clamped to 0–100.
    /// Returns the new score.
    pub fn adjust_alignment(&self, id: &AgentId, delta: i16) -> NexusResult<u8> {
        self.update(id, |agent| {
            let score = (i16::from(agent.alignment_score) + delta).clamp(0, 100);
            agent.alignment_score = score as u8;
            agent.alignment_score
        })
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        let agents = self.lock();
        let total_agents = agents.len();
        let working_agents = agents
            .values()
            .filter(|a| a.status == AgentStatus::Working)
            .count();
        let overall_alignment = if total_agents == 0 {
            0.0
        } else {
            agents.values().map(|a| f64::from(a.alignment_score)).sum::<f64>() / total_agents as f64
        };
        NetworkSnapshot {
            total_agents,
            working_agents,
            overall_alignment,
        }
    }

    /// Mirror workflow progress into agent status: an agent is `Working`
    /// while any of its steps runs and `Idle` once the last one finishes or
    /// fails. Steps assigned to ids outside the registry are ignored.
    pub fn attach(&self, bus: &EventBus) -> Vec<Subscription> {
        let on_start = self.clone();
        let on_done = self.clone();
        let on_fail = self.clone();
        vec![
            bus.subscribe(event_types::WORKFLOW_STEP_STARTED, move |e: &Event| {
                on_start.mirror_step(e, true);
                Ok(())
            }),
            bus.subscribe(event_types::WORKFLOW_STEP_COMPLETED, move |e: &Event| {
                on_done.mirror_step(e, false);
                Ok(())
            }),
            bus.subscribe(event_types::WORKFLOW_STEP_FAILED, move |e: &Event| {
                on_fail.mirror_step(e, false);
                Ok(())
            }),
        ]
    }

    fn mirror_step(&self, event: &Event, started: bool) {
        let EventPayload::WorkflowStep { workflow_id, step, agent, .. } = &event.payload else {
            return;
        };
        if !self.contains(agent) {
            debug!(agent_id = %agent, "step assigned outside the registry");
            return;
        }

        let label = format!("{} step {}", workflow_id, step);
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        let tasks = running.entry(agent.clone()).or_default();
        if started {
            tasks.push(label);
        } else if let Some(pos) = tasks.iter().position(|t| *t == label) {
            tasks.remove(pos);
        }

        let (status, task) = match tasks.last() {
            Some(task) => (AgentStatus::Working, Some(task.clone())),
            None => (AgentStatus::Idle, None),
        };
        if task.is_none() {
            running.remove(agent);
        }
        // Lock order: `running`, then `agents`.
        if let Err(e) = self.set_status(agent, status, task) {
            debug!(agent_id = %agent, error = %e, "agent status not mirrored");
        }
    }
}

#[cfg(test)]
mod tests {
    use nexus_contracts::{
        agent::{AgentId, AgentStatus, DepartmentId},
        error::NexusError,
        event::{event_types, EventPayload},
        workflow::WorkflowId,
    };
    use nexus_core::EventBus;

    use super::AgentRegistry;
    use crate::roster;

    fn id(s: &str) -> AgentId {
        AgentId::from(s)
    }

    #[test]
    fn builtin_roster_is_consistent() {
        let registry = AgentRegistry::builtin().unwrap();
        assert_eq!(registry.departments().len(), 12);
        assert_eq!(registry.len(), 68);

        for dept in registry.departments() {
            let members = registry.department_agents(dept.id.as_str());
            assert_eq!(members.len() as u32, dept.agent_count, "{}", dept.id);
        }
    }

    #[test]
    fn every_agent_is_idle_and_well_aligned_at_start() {
        let registry = AgentRegistry::builtin().unwrap();
        for agent in registry.agents() {
            assert_eq!(agent.status, AgentStatus::Idle);
            assert!((90..=99).contains(&agent.alignment_score));
        }
        assert_eq!(registry.snapshot().working_agents, 0);
    }

    #[test]
    fn dangling_department_is_rejected() {
        let mut agents = roster::agents();
        agents[3].department_id = DepartmentId::new("dept-99");
        match AgentRegistry::new(roster::departments(), agents) {
            Err(NexusError::UnknownDepartment { agent_id, department_id }) => {
                assert_eq!(agent_id, "agent-004");
                assert_eq!(department_id, "dept-99");
            }
            Err(other) => panic!("expected UnknownDepartment, got {:?}", other),
            Ok(_) => panic!("expected UnknownDepartment, got a registry"),
        }
    }

    #[test]
    fn duplicate_agent_is_rejected() {
        let mut agents = roster::agents();
        agents.push(agents[0].clone());
        assert!(matches!(
            AgentRegistry::new(roster::departments(), agents),
            Err(NexusError::ConfigError { .. })
        ));
    }

    #[test]
    fn status_and_alignment_update_in_place() {
        let registry = AgentRegistry::builtin().unwrap();
        registry
            .set_status(&id("agent-017"), AgentStatus::Working, Some("qualify L1".to_string()))
            .unwrap();
        let agent = registry.agent(&id("agent-017")).unwrap();
        assert_eq!(agent.status, AgentStatus::Working);
        assert_eq!(agent.current_task.as_deref(), Some("qualify L1"));
        assert_eq!(registry.snapshot().working_agents, 1);

        assert_eq!(registry.adjust_alignment(&id("agent-017"), 50).unwrap(), 100);
        assert_eq!(registry.adjust_alignment(&id("agent-017"), -300).unwrap(), 0);

        assert!(matches!(
            registry.set_status(&id("agent-404"), AgentStatus::Offline, None),
            Err(NexusError::UnknownAgent { .. })
        ));
    }

    #[test]
    fn attached_registry_follows_step_events() {
        let bus = EventBus::new();
        let registry = AgentRegistry::builtin().unwrap();
        let _subs = registry.attach(&bus);
        let step = |agent: &str| EventPayload::WorkflowStep {
            workflow_id: WorkflowId::from("wf-1"),
            step: 2,
            agent: id(agent),
            duration_ms: 0,
        };

        bus.emit(event_types::WORKFLOW_STEP_STARTED, "workflow-engine", step("agent-016"));
        let agent = registry.agent(&id("agent-016")).unwrap();
        assert_eq!(agent.status, AgentStatus::Working);
        assert_eq!(agent.current_task.as_deref(), Some("wf-1 step 2"));

        bus.emit(event_types::WORKFLOW_STEP_COMPLETED, "workflow-engine", step("agent-016"));
        let agent = registry.agent(&id("agent-016")).unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
        assert!(agent.current_task.is_none());

        // Humans in the loop are not registry agents.
        bus.emit(event_types::WORKFLOW_STEP_STARTED, "workflow-engine", step("human-laurent"));
        assert_eq!(registry.snapshot().working_agents, 0);
    }

    #[test]
    fn agent_stays_working_until_its_last_step_finishes() {
        let bus = EventBus::new();
        let registry = AgentRegistry::builtin().unwrap();
        let _subs = registry.attach(&bus);
        let step = |n: u32| EventPayload::WorkflowStep {
            workflow_id: WorkflowId::from("wf-2"),
            step: n,
            agent: id("agent-001"),
            duration_ms: 0,
        };

        bus.emit(event_types::WORKFLOW_STEP_STARTED, "workflow-engine", step(2));
        bus.emit(event_types::WORKFLOW_STEP_STARTED, "workflow-engine", step(3));

        bus.emit(event_types::WORKFLOW_STEP_COMPLETED, "workflow-engine", step(2));
        let agent = registry.agent(&id("agent-001")).unwrap();
        assert_eq!(agent.status, AgentStatus::Working);
        assert_eq!(agent.current_task.as_deref(), Some("wf-2 step 3"));
        assert_eq!(registry.snapshot().working_agents, 1);

        bus.emit(event_types::WORKFLOW_STEP_FAILED, "workflow-engine", step(3));
        let agent = registry.agent(&id("agent-001")).unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
        assert!(agent.current_task.is_none());
    }
}
