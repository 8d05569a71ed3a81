//! In-memory performance metrics.
//!
//! `PerformanceMonitor` keeps one running record per agent behind an
//! `Arc<Mutex<_>>`. Clones share the table, so a clone can be handed to a
//! bus subscription while the original serves queries.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use nexus_contracts::{
    agent::AgentId,
    event::{event_types, Event, EventPayload},
};
use nexus_core::{EventBus, Subscription};

/// Watch-list and alert threshold.
///
/// ```toml
/// [monitor]
/// watch_list = ["agent-001", "agent-004"]
/// latency_threshold_ms = 5000.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Agents checked by `bottleneck_alerts`.
    pub watch_list: Vec<AgentId>,
    /// Alert when an agent's mean latency is strictly above this.
    pub latency_threshold_ms: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            watch_list: ["agent-001", "agent-004", "agent-016", "agent-044", "agent-055"]
                .into_iter()
                .map(AgentId::from)
                .collect(),
            latency_threshold_ms: 5000.0,
        }
    }
}

/// Running record for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetrics {
    pub total_messages: u64,
    /// Incremental mean of every tracked response time, in milliseconds.
    pub avg_response_time: f64,
    /// Percentage of tracked calls that succeeded, 0–100.
    pub success_rate: f64,
    pub last_active: DateTime<Utc>,
}

impl AgentMetrics {
    fn record(&mut self, response_time_ms: f64, success: bool) {
        self.total_messages += 1;
        let n = self.total_messages as f64;
        let hit = if success { 100.0 } else { 0.0 };
        self.avg_response_time = (self.avg_response_time * (n - 1.0) + response_time_ms) / n;
        self.success_rate = (self.success_rate * (n - 1.0) + hit) / n;
        self.last_active = Utc::now();
    }
}

impl Default for AgentMetrics {
    fn default() -> Self {
        Self {
            total_messages: 0,
            avg_response_time: 0.0,
            success_rate: 100.0,
            last_active: Utc::now(),
        }
    }
}

#[derive(Clone, Default)]
pub struct PerformanceMonitor {
    config: Arc<MonitorConfig>,
    pub(crate) metrics: Arc<Mutex<HashMap<AgentId, AgentMetrics>>>,
}

impl PerformanceMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config: Arc::new(config),
            metrics: Arc::default(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AgentId, AgentMetrics>> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fold one call into `agent_id`'s record.
    pub fn track_message(&self, agent_id: &AgentId, response_time_ms: f64, success: bool) {
        let mut metrics = self.lock();
        let record = metrics.entry(agent_id.clone()).or_default();
        record.record(response_time_ms, success);
        debug!(
            agent_id = %agent_id,
            response_time_ms,
            success,
            avg_response_time = record.avg_response_time,
            "message tracked"
        );
    }

    pub fn agent_metrics(&self, agent_id: &AgentId) -> Option<AgentMetrics> {
        self.lock().get(agent_id).cloned()
    }

    /// Every tracked agent, sorted by id.
    pub fn all_metrics(&self) -> Vec<(AgentId, AgentMetrics)> {
        let mut all: Vec<_> = self
            .lock()
            .iter()
            .map(|(id, m)| (id.clone(), m.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// One alert per watch-listed agent whose mean latency is over the
    /// threshold, in watch-list order.
    pub fn bottleneck_alerts(&self) -> Vec<String> {
        let metrics = self.lock();
        let alerts: Vec<String> = self
            .config
            .watch_list
            .iter()
            .filter_map(|id| {
                let m = metrics.get(id)?;
                (m.avg_response_time > self.config.latency_threshold_ms).then(|| {
                    format!("{} experiencing high latency: {:.0}ms", id, m.avg_response_time)
                })
            })
            .collect();
        if !alerts.is_empty() {
            warn!(alerts = alerts.len(), "bottleneck agents detected");
        }
        alerts
    }

    pub fn reset_metrics(&self) {
        self.lock().clear();
    }

    /// Track workflow steps automatically: `workflow.step.completed` counts
    /// as a success and `workflow.step.failed` as a failure, each with the
    /// step's measured duration.
    pub fn attach(&self, bus: &EventBus) -> Vec<Subscription> {
        let on_done = self.clone();
        let on_fail = self.clone();
        vec![
            bus.subscribe(event_types::WORKFLOW_STEP_COMPLETED, move |e: &Event| {
                on_done.track_step(e, true);
                Ok(())
            }),
            bus.subscribe(event_types::WORKFLOW_STEP_FAILED, move |e: &Event| {
                on_fail.track_step(e, false);
                Ok(())
            }),
        ]
    }

    fn track_step(&self, event: &Event, success: bool) {
        if let EventPayload::WorkflowStep { agent, duration_ms, .. } = &event.payload {
            self.track_message(agent, *duration_ms as f64, success);
        }
    }
}
