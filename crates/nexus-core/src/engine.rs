//! The NEXUS workflow engine: dependency-aware, event-publishing step runner.
//!
//! Lifecycle of one workflow:
//!
//!   create → pending → execute → in_progress → {completed | failed}
//!
//! `execute_workflow` runs the workflow's steps in dependency waves. Steps of
//! one wave run concurrently; their outputs are written and their events
//! published in declaration order once the whole wave has finished. Every
//! transition is published on the bus:
//!
//!   workflow.created, workflow.started, workflow.step.started,
//!   workflow.step.completed, workflow.step.failed, workflow.completed,
//!   workflow.failed
//!
//! The workflow table is only ever locked for short, non-async sections and
//! never while bus handlers run, because handlers re-enter the engine.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use nexus_contracts::{
    error::{NexusError, NexusResult},
    event::{event_types, Event, EventPayload},
    workflow::{
        ExecutionOutcome, StepOutput, Workflow, WorkflowId, WorkflowSpec, WorkflowStatus,
        WorkflowStep,
    },
};

use crate::{
    bus::{EventBus, Subscription},
    config::EngineConfig,
    schedule::StepGraph,
    template::{EventBinding, TemplateRegistry},
    traits::{ApprovalDecision, ApprovalGate, StepContext, StepExecutor},
};

/// Publisher name stamped on every event the engine emits.
pub const ENGINE_PUBLISHER: &str = "workflow-engine";

/// Publisher name for events injected through `trigger_event`.
pub const EXTERNAL_PUBLISHER: &str = "external";

// ── Workflow table ────────────────────────────────────────────────────────────

#[derive(Default)]
struct WorkflowTable {
    workflows: HashMap<WorkflowId, Workflow>,
    /// Creation order, for stable listings.
    order: Vec<WorkflowId>,
    /// Terminal workflows in the order they finished, oldest first.
    finished: VecDeque<WorkflowId>,
}

impl WorkflowTable {
    fn insert(&mut self, workflow: Workflow) {
        self.order.push(workflow.workflow_id.clone());
        self.workflows.insert(workflow.workflow_id.clone(), workflow);
    }

    /// Record that `workflow_id` just finished, then drop the earliest
    /// finished workflows beyond `limit`. The one that just finished is
    /// always kept, even with a limit of zero.
    fn finish(&mut self, workflow_id: &WorkflowId, limit: Option<usize>) {
        self.finished.push_back(workflow_id.clone());
        let Some(limit) = limit else {
            return;
        };

        let mut evicted = false;
        while self.finished.len() > limit.max(1) {
            let Some(id) = self.finished.pop_front() else {
                break;
            };
            self.workflows.remove(&id);
            debug!(workflow_id = %id, "evicted finished workflow");
            evicted = true;
        }
        if evicted {
            self.order.retain(|id| self.workflows.contains_key(id));
        }
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Creates, executes, and tracks workflows.
///
/// Construct one engine per process and share it as `Arc<WorkflowEngine>`.
/// The engine owns its step executor and approval gate; the bus is shared
/// with every other service.
pub struct WorkflowEngine {
    bus: EventBus,
    executor: Box<dyn StepExecutor>,
    approvals: Box<dyn ApprovalGate>,
    config: EngineConfig,
    table: Mutex<WorkflowTable>,
    bindings: Mutex<Vec<Subscription>>,
}

impl WorkflowEngine {
    pub fn new(
        bus: EventBus,
        executor: Box<dyn StepExecutor>,
        approvals: Box<dyn ApprovalGate>,
        config: EngineConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            bus,
            executor,
            approvals,
            config,
            table: Mutex::new(WorkflowTable::default()),
            bindings: Mutex::new(Vec::new()),
        })
    }

    /// An engine whose steps only wait `config.step_delay_ms` and whose
    /// approval gate approves everything.
    pub fn simulated(bus: EventBus, config: EngineConfig) -> Arc<Self> {
        let executor = SimulatedStepExecutor::new(config.step_delay());
        Self::new(bus, Box::new(executor), Box::new(AutoApprove), config)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn lock_table(&self) -> MutexGuard<'_, WorkflowTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Creation ─────────────────────────────────────────────────────────────

    /// Validate `spec`, register it as a `pending` workflow, and publish
    /// `workflow.created`.
    ///
    /// # Errors
    ///
    /// `InvalidWorkflow` for an empty step list, duplicate step numbers,
    /// undeclared or cyclic dependencies; `InvalidTrigger` for unparseable
    /// trigger expressions.
    pub fn create_workflow(&self, spec: WorkflowSpec) -> NexusResult<Workflow> {
        if spec.steps.is_empty() {
            return Err(NexusError::InvalidWorkflow {
                reason: format!("workflow '{}' has no steps", spec.name),
            });
        }
        StepGraph::build(spec.steps.iter().map(|s| (s.step, s.trigger.as_deref())))?;

        let workflow = Workflow {
            workflow_id: WorkflowId::new(),
            name: spec.name,
            description: spec.description,
            steps: spec
                .steps
                .into_iter()
                .map(|s| WorkflowStep {
                    step: s.step,
                    action: s.action,
                    agent: s.agent,
                    trigger: s.trigger,
                    output: None,
                })
                .collect(),
            status: WorkflowStatus::Pending,
            coordinator: spec.coordinator,
            created_at: Utc::now(),
        };

        self.lock_table().insert(workflow.clone());

        info!(
            workflow_id = %workflow.workflow_id,
            name = %workflow.name,
            steps = workflow.steps.len(),
            "workflow created"
        );
        self.publish(
            event_types::WORKFLOW_CREATED,
            EventPayload::Workflow {
                workflow_id: workflow.workflow_id.clone(),
                name: workflow.name.clone(),
            },
        );

        Ok(workflow)
    }

    /// Create `spec` and start executing it on the ambient tokio runtime.
    ///
    /// Without a runtime the workflow is left `pending` and a warning is
    /// logged; it can still be executed later.
    pub fn launch(self: &Arc<Self>, spec: WorkflowSpec) -> NexusResult<WorkflowId> {
        let workflow = self.create_workflow(spec)?;
        let workflow_id = workflow.workflow_id;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let engine = Arc::clone(self);
                let id = workflow_id.clone();
                handle.spawn(async move {
                    engine.execute_workflow(&id).await;
                });
            }
            Err(_) => {
                warn!(
                    workflow_id = %workflow_id,
                    "no async runtime available; workflow left pending"
                );
            }
        }

        Ok(workflow_id)
    }

    // ── Execution ────────────────────────────────────────────────────────────

    /// Run every step of a `pending` workflow.
    ///
    /// # Pipeline
    ///
    /// 1. Look up the workflow; unknown → `NotFound`, not pending → `NotRunnable`
    /// 2. Mark it `in_progress`, publish `workflow.started`
    /// 3. For each dependency wave (or each step, in sequential mode):
    ///    a. stop if the workflow was closed from outside
    ///    b. ask the approval gate about `approved`-gated steps; a rejection
    ///       fails the workflow
    ///    c. publish `workflow.step.started`, run the wave concurrently
    ///    d. write outputs, publish `workflow.step.completed`; any executor
    ///       error publishes `workflow.step.failed` and fails the workflow
    /// 4. Mark it `completed`, publish `workflow.completed`
    ///
    /// Never returns an error: every failure is logged and reported through
    /// `ExecutionOutcome`.
    pub async fn execute_workflow(&self, workflow_id: &WorkflowId) -> ExecutionOutcome {
        let (name, steps) = match self.begin(workflow_id) {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        info!(workflow_id = %workflow_id, name = %name, "executing workflow");
        self.publish(
            event_types::WORKFLOW_STARTED,
            EventPayload::Workflow {
                workflow_id: workflow_id.clone(),
                name: name.clone(),
            },
        );

        let graph = match StepGraph::build(steps.iter().map(|s| (s.step, s.trigger.as_deref()))) {
            Ok(graph) => graph,
            Err(e) => return self.abort(workflow_id, e.to_string()),
        };

        for wave in graph.waves(self.config.execution_mode) {
            if let Some(outcome) = self.interrupted(workflow_id) {
                return outcome;
            }

            for &idx in &wave {
                if !graph.is_gated(idx) {
                    continue;
                }
                let Some(snapshot) = self.get_workflow(workflow_id) else {
                    return ExecutionOutcome::NotFound;
                };
                if let ApprovalDecision::Rejected { reason } =
                    self.approvals.review(&snapshot, &steps[idx])
                {
                    warn!(
                        workflow_id = %workflow_id,
                        step = steps[idx].step,
                        reason = %reason,
                        "approval rejected"
                    );
                    return self.abort(
                        workflow_id,
                        format!("approval for step {} rejected: {}", steps[idx].step, reason),
                    );
                }
            }

            for &idx in &wave {
                debug!(
                    workflow_id = %workflow_id,
                    step = steps[idx].step,
                    agent = %steps[idx].agent,
                    action = %steps[idx].action,
                    "executing step"
                );
                self.publish(
                    event_types::WORKFLOW_STEP_STARTED,
                    step_payload(workflow_id, &steps[idx], Duration::ZERO),
                );
            }

            let runs = wave.iter().map(|&idx| {
                let ctx = StepContext {
                    workflow_id: workflow_id.clone(),
                    workflow_name: name.clone(),
                    step: steps[idx].clone(),
                };
                async move {
                    let started = Instant::now();
                    let result = self.executor.execute(&ctx).await;
                    (idx, result, started.elapsed())
                }
            });

            let mut failure: Option<String> = None;
            for (idx, result, elapsed) in join_all(runs).await {
                let step = &steps[idx];
                match result {
                    Ok(output) => {
                        self.write_output(workflow_id, step.step, output);
                        self.publish(
                            event_types::WORKFLOW_STEP_COMPLETED,
                            step_payload(workflow_id, step, elapsed),
                        );
                    }
                    Err(e) => {
                        warn!(
                            workflow_id = %workflow_id,
                            step = step.step,
                            agent = %step.agent,
                            error = %e,
                            "step failed"
                        );
                        self.publish(
                            event_types::WORKFLOW_STEP_FAILED,
                            step_payload(workflow_id, step, elapsed),
                        );
                        failure.get_or_insert_with(|| format!("step {} failed: {}", step.step, e));
                    }
                }
            }

            if let Some(reason) = failure {
                return self.abort(workflow_id, reason);
            }
        }

        if self.complete_workflow(workflow_id) {
            info!(workflow_id = %workflow_id, name = %name, "workflow completed");
            ExecutionOutcome::Completed
        } else {
            self.interrupted(workflow_id)
                .unwrap_or(ExecutionOutcome::NotFound)
        }
    }

    /// Move a pending workflow to `in_progress` and snapshot its steps.
    fn begin(&self, workflow_id: &WorkflowId) -> Result<(String, Vec<WorkflowStep>), ExecutionOutcome> {
        let mut table = self.lock_table();
        let Some(workflow) = table.workflows.get_mut(workflow_id) else {
            warn!(workflow_id = %workflow_id, "workflow not found");
            return Err(ExecutionOutcome::NotFound);
        };
        if workflow.status != WorkflowStatus::Pending {
            warn!(
                workflow_id = %workflow_id,
                status = %workflow.status,
                "workflow is not pending; refusing to execute"
            );
            return Err(ExecutionOutcome::NotRunnable {
                status: workflow.status,
            });
        }
        workflow.status = WorkflowStatus::InProgress;
        Ok((workflow.name.clone(), workflow.steps.clone()))
    }

    /// `Some` when the workflow is no longer `in_progress`.
    fn interrupted(&self, workflow_id: &WorkflowId) -> Option<ExecutionOutcome> {
        let table = self.lock_table();
        match table.workflows.get(workflow_id).map(|wf| wf.status) {
            Some(WorkflowStatus::InProgress) => None,
            Some(WorkflowStatus::Completed) => Some(ExecutionOutcome::Completed),
            Some(WorkflowStatus::Failed) => Some(ExecutionOutcome::Failed {
                reason: "workflow was closed while executing".to_string(),
            }),
            Some(status @ WorkflowStatus::Pending) => Some(ExecutionOutcome::NotRunnable { status }),
            None => Some(ExecutionOutcome::NotFound),
        }
    }

    fn abort(&self, workflow_id: &WorkflowId, reason: String) -> ExecutionOutcome {
        self.fail_workflow(workflow_id, &reason);
        ExecutionOutcome::Failed { reason }
    }

    fn write_output(&self, workflow_id: &WorkflowId, step: u32, output: StepOutput) {
        let mut table = self.lock_table();
        let Some(workflow) = table.workflows.get_mut(workflow_id) else {
            return;
        };
        if workflow.status != WorkflowStatus::InProgress {
            return;
        }
        if let Some(slot) = workflow.step_mut(step) {
            slot.output = Some(output);
        }
    }

    // ── Manual control ───────────────────────────────────────────────────────

    /// Apply a forward-only status change. Returns the workflow name when the
    /// transition happened.
    fn transition(&self, workflow_id: &WorkflowId, next: WorkflowStatus) -> Option<String> {
        let mut table = self.lock_table();
        let workflow = table.workflows.get_mut(workflow_id)?;
        if !workflow.status.can_transition_to(next) {
            debug!(
                workflow_id = %workflow_id,
                from = %workflow.status,
                to = %next,
                "ignoring status transition"
            );
            return None;
        }
        workflow.status = next;
        let name = workflow.name.clone();

        if next.is_terminal() {
            table.finish(workflow_id, self.config.max_finished_workflows);
        }
        Some(name)
    }

    /// Mark a workflow `completed` and publish `workflow.completed`.
    ///
    /// Returns false (and publishes nothing) for unknown or already
    /// terminal workflows.
    pub fn complete_workflow(&self, workflow_id: &WorkflowId) -> bool {
        let Some(name) = self.transition(workflow_id, WorkflowStatus::Completed) else {
            return false;
        };
        self.publish(
            event_types::WORKFLOW_COMPLETED,
            EventPayload::Workflow {
                workflow_id: workflow_id.clone(),
                name,
            },
        );
        true
    }

    /// Mark a workflow `failed` and publish `workflow.failed`.
    ///
    /// Returns false (and publishes nothing) for unknown or already
    /// terminal workflows.
    pub fn fail_workflow(&self, workflow_id: &WorkflowId, reason: &str) -> bool {
        let Some(name) = self.transition(workflow_id, WorkflowStatus::Failed) else {
            return false;
        };
        warn!(workflow_id = %workflow_id, reason = %reason, "workflow failed");
        self.publish(
            event_types::WORKFLOW_FAILED,
            EventPayload::WorkflowFailed {
                workflow_id: workflow_id.clone(),
                name,
                reason: reason.to_string(),
            },
        );
        true
    }

    /// Overwrite one step's output by hand.
    ///
    /// # Errors
    ///
    /// `WorkflowNotFound` for an unknown id; `InvalidWorkflow` when the step
    /// does not exist or the workflow is already terminal.
    pub fn record_step_output(
        &self,
        workflow_id: &WorkflowId,
        step: u32,
        output: StepOutput,
    ) -> NexusResult<()> {
        let mut table = self.lock_table();
        let workflow = table
            .workflows
            .get_mut(workflow_id)
            .ok_or_else(|| NexusError::WorkflowNotFound {
                workflow_id: workflow_id.to_string(),
            })?;
        if workflow.status.is_terminal() {
            return Err(NexusError::InvalidWorkflow {
                reason: format!("workflow '{}' is already {}", workflow_id, workflow.status),
            });
        }
        let slot = workflow
            .step_mut(step)
            .ok_or_else(|| NexusError::InvalidWorkflow {
                reason: format!("workflow '{}' has no step {}", workflow_id, step),
            })?;
        slot.output = Some(output);
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn get_workflow(&self, workflow_id: &WorkflowId) -> Option<Workflow> {
        self.lock_table().workflows.get(workflow_id).cloned()
    }

    /// Pending and in-progress workflows, oldest first.
    pub fn active_workflows(&self) -> Vec<Workflow> {
        let table = self.lock_table();
        table
            .order
            .iter()
            .filter_map(|id| table.workflows.get(id))
            .filter(|wf| wf.status.is_active())
            .cloned()
            .collect()
    }

    pub fn workflow_count(&self) -> usize {
        self.lock_table().workflows.len()
    }

    // ── Events ───────────────────────────────────────────────────────────────

    /// Publish an arbitrary event on behalf of an external caller.
    pub fn trigger_event(&self, event_type: impl Into<String>, payload: EventPayload) -> Event {
        self.bus.emit(event_type, EXTERNAL_PUBLISHER, payload)
    }

    fn publish(&self, event_type: &str, payload: EventPayload) {
        self.bus.emit(event_type, ENGINE_PUBLISHER, payload);
    }

    /// Subscribe one handler per binding that instantiates the bound template
    /// and launches the resulting workflow.
    ///
    /// # Errors
    ///
    /// `UnknownTemplate` if any binding names a template missing from
    /// `registry`; nothing is subscribed in that case.
    pub fn bind_templates(
        self: &Arc<Self>,
        registry: Arc<TemplateRegistry>,
        bindings: &[EventBinding],
    ) -> NexusResult<()> {
        if let Some(missing) = bindings.iter().find(|b| !registry.contains(&b.template)) {
            return Err(NexusError::UnknownTemplate {
                name: missing.template.clone(),
            });
        }

        let mut subscriptions = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let engine = Arc::downgrade(self);
            let registry = Arc::clone(&registry);
            let template = binding.template.clone();

            let subscription = self.bus.subscribe(binding.event.clone(), move |event: &Event| {
                let Some(engine) = engine.upgrade() else {
                    return Ok(());
                };
                info!(
                    event_type = %event.event_type,
                    template = %template,
                    "event bound to workflow template"
                );
                let spec = registry.instantiate(&template, event)?;
                engine.launch(spec)?;
                Ok(())
            });
            subscriptions.push(subscription);
        }

        self.bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(subscriptions);
        Ok(())
    }

    /// Remove every template binding installed by `bind_templates`.
    pub fn unbind_templates(&self) {
        let subscriptions: Vec<Subscription> = self
            .bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for subscription in subscriptions {
            subscription.unsubscribe();
        }
    }
}

fn step_payload(workflow_id: &WorkflowId, step: &WorkflowStep, elapsed: Duration) -> EventPayload {
    EventPayload::WorkflowStep {
        workflow_id: workflow_id.clone(),
        step: step.step,
        agent: step.agent.clone(),
        duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    }
}

// ── Default collaborators ─────────────────────────────────────────────────────

/// Stand-in for real agent work: waits, then reports success.
#[derive(Debug, Clone)]
pub struct SimulatedStepExecutor {
    delay: Duration,
}

impl SimulatedStepExecutor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl StepExecutor for SimulatedStepExecutor {
    async fn execute(&self, ctx: &StepContext) -> NexusResult<StepOutput> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(StepOutput::completed(format!(
            "Simulated output from {}",
            ctx.step.agent
        )))
    }
}

/// Approves every gated step.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl ApprovalGate for AutoApprove {
    fn review(&self, _workflow: &Workflow, _step: &WorkflowStep) -> ApprovalDecision {
        ApprovalDecision::Approved
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use nexus_contracts::{
        error::{NexusError, NexusResult},
        event::{event_types, Event, EventPayload},
        workflow::{
            ExecutionOutcome, StepOutput, StepSpec, Workflow, WorkflowId, WorkflowSpec,
            WorkflowStatus, WorkflowStep,
        },
    };

    use super::{AutoApprove, SimulatedStepExecutor, WorkflowEngine};
    use crate::{
        bus::EventBus,
        config::{EngineConfig, ExecutionMode},
        template::{EventBinding, TemplateRegistry},
        traits::{ApprovalDecision, ApprovalGate, StepContext, StepExecutor, WorkflowTemplate},
    };

    // ── Mock helpers ─────────────────────────────────────────────────────────

    fn linear_spec() -> WorkflowSpec {
        WorkflowSpec {
            name: "Linear".to_string(),
            description: "three steps in a row".to_string(),
            coordinator: Some("agent-001".into()),
            steps: vec![
                StepSpec::new(1, "First", "agent-017"),
                StepSpec::new(2, "Second", "agent-022").after("step:1:complete"),
                StepSpec::new(3, "Third", "agent-013").after("step:2:complete"),
            ],
        }
    }

    fn fan_out_spec() -> WorkflowSpec {
        WorkflowSpec {
            name: "Fan out".to_string(),
            description: String::new(),
            coordinator: None,
            steps: vec![
                StepSpec::new(1, "Root", "agent-001"),
                StepSpec::new(2, "Branch A", "agent-008").after("parallel:1"),
                StepSpec::new(3, "Branch B", "agent-030").after("parallel:1"),
                StepSpec::new(4, "Branch C", "agent-015").after("parallel:1"),
                StepSpec::new(5, "Join", "agent-001").after("step:2,3,4:complete"),
            ],
        }
    }

    fn engine(bus: &EventBus) -> Arc<WorkflowEngine> {
        WorkflowEngine::simulated(bus.clone(), EngineConfig::immediate())
    }

    /// Records every event type seen on the bus, in order.
    fn record_all(bus: &EventBus) -> Arc<Mutex<Vec<Event>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe("*", move |e: &Event| {
            sink.lock().unwrap().push(e.clone());
            Ok(())
        });
        seen
    }

    /// Tracks the most steps ever running at the same time and the start order.
    struct ConcurrencyTracker {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        started: Mutex<Vec<u32>>,
    }

    impl ConcurrencyTracker {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                started: Mutex::new(Vec::new()),
            })
        }
    }

    struct TrackingExecutor(Arc<ConcurrencyTracker>);

    #[async_trait]
    impl StepExecutor for TrackingExecutor {
        async fn execute(&self, ctx: &StepContext) -> NexusResult<StepOutput> {
            self.0.started.lock().unwrap().push(ctx.step.step);
            let now = self.0.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.0.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(StepOutput::completed(format!("done by {}", ctx.step.agent)))
        }
    }

    /// Fails one specific step number.
    struct FailingExecutor {
        fail_step: u32,
    }

    #[async_trait]
    impl StepExecutor for FailingExecutor {
        async fn execute(&self, ctx: &StepContext) -> NexusResult<StepOutput> {
            if ctx.step.step == self.fail_step {
                return Err(NexusError::StepFailed {
                    step: ctx.step.step,
                    reason: "agent unavailable".to_string(),
                });
            }
            Ok(StepOutput::completed("ok"))
        }
    }

    /// Holds step 1 until released, signalling once it has started.
    struct HeldExecutor {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl StepExecutor for HeldExecutor {
        async fn execute(&self, ctx: &StepContext) -> NexusResult<StepOutput> {
            if ctx.step.step == 1 {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(StepOutput::completed(format!("done by {}", ctx.step.agent)))
        }
    }

    struct RejectAll;

    impl ApprovalGate for RejectAll {
        fn review(&self, _workflow: &Workflow, step: &WorkflowStep) -> ApprovalDecision {
            ApprovalDecision::Rejected {
                reason: format!("no sign-off for '{}'", step.action),
            }
        }
    }

    // ── Creation ─────────────────────────────────────────────────────────────

    #[test]
    fn create_registers_pending_workflow_and_publishes() {
        let bus = EventBus::new();
        let engine = engine(&bus);

        let workflow = engine.create_workflow(linear_spec()).unwrap();

        assert_eq!(workflow.status, WorkflowStatus::Pending);
        assert!(workflow.steps.iter().all(|s| s.output.is_none()));
        assert_eq!(engine.get_workflow(&workflow.workflow_id), Some(workflow.clone()));

        let created = bus.history(Some(event_types::WORKFLOW_CREATED));
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].payload.workflow_id(), Some(&workflow.workflow_id));
        assert_eq!(created[0].publisher, "workflow-engine");
    }

    #[test]
    fn create_rejects_invalid_definitions() {
        let engine = engine(&EventBus::new());

        let mut empty = linear_spec();
        empty.steps.clear();
        assert!(matches!(engine.create_workflow(empty), Err(NexusError::InvalidWorkflow { .. })));

        let mut bad_trigger = linear_spec();
        bad_trigger.steps[1].trigger = Some("whenever".to_string());
        assert!(matches!(
            engine.create_workflow(bad_trigger),
            Err(NexusError::InvalidTrigger { step: 2, .. })
        ));

        assert_eq!(engine.workflow_count(), 0);
    }

    // ── Execution ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn execute_drives_workflow_to_completion() {
        let bus = EventBus::new();
        let engine = engine(&bus);
        let workflow = engine.create_workflow(linear_spec()).unwrap();
        let id = workflow.workflow_id.clone();

        assert_eq!(engine.active_workflows().len(), 1);

        let outcome = engine.execute_workflow(&id).await;

        assert_eq!(outcome, ExecutionOutcome::Completed);
        let done = engine.get_workflow(&id).unwrap();
        assert_eq!(done.status, WorkflowStatus::Completed);
        for step in &done.steps {
            let output = step.output.as_ref().expect("every step must have output");
            assert!(output.result.contains(step.agent.as_str()));
        }
        assert!(engine.active_workflows().is_empty());
    }

    #[tokio::test]
    async fn lifecycle_events_are_published_in_order() {
        let bus = EventBus::new();
        let engine = engine(&bus);
        let seen = record_all(&bus);
        let workflow = engine.create_workflow(linear_spec()).unwrap();

        engine.execute_workflow(&workflow.workflow_id).await;

        let types: Vec<String> = seen.lock().unwrap().iter().map(|e| e.event_type.clone()).collect();
        assert_eq!(
            types,
            vec![
                "workflow.created",
                "workflow.started",
                "workflow.step.started",
                "workflow.step.completed",
                "workflow.step.started",
                "workflow.step.completed",
                "workflow.step.started",
                "workflow.step.completed",
                "workflow.completed",
            ]
        );

        let steps: Vec<u32> = bus
            .history(Some(event_types::WORKFLOW_STEP_COMPLETED))
            .into_iter()
            .filter_map(|e| match e.payload {
                EventPayload::WorkflowStep { step, .. } => Some(step),
                _ => None,
            })
            .collect();
        assert_eq!(steps, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn unknown_workflow_is_reported_not_raised() {
        let bus = EventBus::new();
        let engine = engine(&bus);

        let outcome = engine.execute_workflow(&WorkflowId::from("wf-missing")).await;

        assert_eq!(outcome, ExecutionOutcome::NotFound);
        assert!(bus.history(None).is_empty());
    }

    #[tokio::test]
    async fn second_execution_is_refused() {
        let engine = engine(&EventBus::new());
        let workflow = engine.create_workflow(linear_spec()).unwrap();

        assert_eq!(engine.execute_workflow(&workflow.workflow_id).await, ExecutionOutcome::Completed);
        assert_eq!(
            engine.execute_workflow(&workflow.workflow_id).await,
            ExecutionOutcome::NotRunnable { status: WorkflowStatus::Completed }
        );
    }

    #[tokio::test]
    async fn parallel_steps_run_concurrently() {
        let tracker = ConcurrencyTracker::new();
        let engine = WorkflowEngine::new(
            EventBus::new(),
            Box::new(TrackingExecutor(Arc::clone(&tracker))),
            Box::new(AutoApprove),
            EngineConfig::immediate(),
        );
        let workflow = engine.create_workflow(fan_out_spec()).unwrap();

        let outcome = engine.execute_workflow(&workflow.workflow_id).await;

        assert_eq!(outcome, ExecutionOutcome::Completed);
        assert_eq!(tracker.peak.load(Ordering::SeqCst), 3, "branches A, B, C overlap");
        let started = tracker.started.lock().unwrap().clone();
        assert_eq!(started[0], 1);
        assert_eq!(started[4], 5);
    }

    #[tokio::test]
    async fn sequential_mode_runs_one_step_at_a_time() {
        let tracker = ConcurrencyTracker::new();
        let config = EngineConfig {
            execution_mode: ExecutionMode::Sequential,
            ..EngineConfig::immediate()
        };
        let engine = WorkflowEngine::new(
            EventBus::new(),
            Box::new(TrackingExecutor(Arc::clone(&tracker))),
            Box::new(AutoApprove),
            config,
        );
        let workflow = engine.create_workflow(fan_out_spec()).unwrap();

        engine.execute_workflow(&workflow.workflow_id).await;

        assert_eq!(tracker.peak.load(Ordering::SeqCst), 1);
        assert_eq!(*tracker.started.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn step_failure_fails_the_workflow() {
        let bus = EventBus::new();
        let engine = WorkflowEngine::new(
            bus.clone(),
            Box::new(FailingExecutor { fail_step: 2 }),
            Box::new(AutoApprove),
            EngineConfig::immediate(),
        );
        let workflow = engine.create_workflow(linear_spec()).unwrap();

        let outcome = engine.execute_workflow(&workflow.workflow_id).await;

        match outcome {
            ExecutionOutcome::Failed { reason } => assert!(reason.contains("agent unavailable")),
            other => panic!("expected Failed, got {:?}", other),
        }
        let failed = engine.get_workflow(&workflow.workflow_id).unwrap();
        assert_eq!(failed.status, WorkflowStatus::Failed);
        assert!(failed.step(1).unwrap().output.is_some());
        assert!(failed.step(3).unwrap().output.is_none(), "step 3 must never run");
        assert_eq!(bus.history(Some(event_types::WORKFLOW_STEP_FAILED)).len(), 1);
        assert_eq!(bus.history(Some(event_types::WORKFLOW_FAILED)).len(), 1);
        assert!(bus.history(Some(event_types::WORKFLOW_COMPLETED)).is_empty());
    }

    #[tokio::test]
    async fn rejected_approval_fails_before_gated_step() {
        let engine = WorkflowEngine::new(
            EventBus::new(),
            Box::new(SimulatedStepExecutor::new(Duration::ZERO)),
            Box::new(RejectAll),
            EngineConfig::immediate(),
        );
        let mut spec = linear_spec();
        spec.steps[2].trigger = Some("step:2:approved".to_string());
        let workflow = engine.create_workflow(spec).unwrap();

        let outcome = engine.execute_workflow(&workflow.workflow_id).await;

        assert!(matches!(outcome, ExecutionOutcome::Failed { ref reason } if reason.contains("step 3")));
        let failed = engine.get_workflow(&workflow.workflow_id).unwrap();
        assert!(failed.step(2).unwrap().output.is_some());
        assert!(failed.step(3).unwrap().output.is_none());
    }

    #[tokio::test]
    async fn failing_mid_wave_stops_before_the_next_wave() {
        let bus = EventBus::new();
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let engine = WorkflowEngine::new(
            bus.clone(),
            Box::new(HeldExecutor {
                entered: Arc::clone(&entered),
                release: Arc::clone(&release),
            }),
            Box::new(AutoApprove),
            EngineConfig::immediate(),
        );
        let id = engine.create_workflow(linear_spec()).unwrap().workflow_id;

        let run = tokio::spawn({
            let engine = Arc::clone(&engine);
            let id = id.clone();
            async move { engine.execute_workflow(&id).await }
        });

        entered.notified().await;
        assert!(engine.fail_workflow(&id, "cancelled by operator"));
        release.notify_one();

        assert_eq!(
            run.await.unwrap(),
            ExecutionOutcome::Failed {
                reason: "workflow was closed while executing".to_string()
            }
        );
        let failed = engine.get_workflow(&id).unwrap();
        assert_eq!(failed.status, WorkflowStatus::Failed);
        assert!(
            failed.steps.iter().all(|s| s.output.is_none()),
            "the in-flight output is dropped and later steps never run"
        );
        assert_eq!(bus.history(Some(event_types::WORKFLOW_STEP_STARTED)).len(), 1);
        assert_eq!(bus.history(Some(event_types::WORKFLOW_FAILED)).len(), 1);
        assert!(bus.history(Some(event_types::WORKFLOW_COMPLETED)).is_empty());
    }

    // ── Manual control ───────────────────────────────────────────────────────

    #[test]
    fn terminal_status_is_never_left() {
        let bus = EventBus::new();
        let engine = engine(&bus);
        let id = engine.create_workflow(linear_spec()).unwrap().workflow_id;

        assert!(engine.fail_workflow(&id, "cancelled"));
        assert!(!engine.complete_workflow(&id));
        assert!(!engine.fail_workflow(&id, "again"));
        assert_eq!(engine.get_workflow(&id).unwrap().status, WorkflowStatus::Failed);

        let other = engine.create_workflow(linear_spec()).unwrap().workflow_id;
        assert!(engine.complete_workflow(&other));
        assert!(!engine.fail_workflow(&other, "too late"));
        assert_eq!(engine.get_workflow(&other).unwrap().status, WorkflowStatus::Completed);

        assert_eq!(bus.history(Some(event_types::WORKFLOW_FAILED)).len(), 1);
        assert_eq!(bus.history(Some(event_types::WORKFLOW_COMPLETED)).len(), 1);
    }

    #[tokio::test]
    async fn failed_workflow_cannot_be_executed() {
        let engine = engine(&EventBus::new());
        let id = engine.create_workflow(linear_spec()).unwrap().workflow_id;
        engine.fail_workflow(&id, "cancelled");

        assert_eq!(
            engine.execute_workflow(&id).await,
            ExecutionOutcome::NotRunnable { status: WorkflowStatus::Failed }
        );
    }

    #[test]
    fn record_step_output_updates_one_step() {
        let engine = engine(&EventBus::new());
        let id = engine.create_workflow(linear_spec()).unwrap().workflow_id;

        engine
            .record_step_output(&id, 2, StepOutput::completed("logged by hand"))
            .unwrap();
        let workflow = engine.get_workflow(&id).unwrap();
        assert_eq!(workflow.step(2).unwrap().output.as_ref().unwrap().result, "logged by hand");
        assert!(workflow.step(1).unwrap().output.is_none());

        assert!(matches!(
            engine.record_step_output(&id, 9, StepOutput::completed("x")),
            Err(NexusError::InvalidWorkflow { .. })
        ));
        assert!(matches!(
            engine.record_step_output(&WorkflowId::from("wf-none"), 1, StepOutput::completed("x")),
            Err(NexusError::WorkflowNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn finished_workflows_are_evicted_oldest_first() {
        let config = EngineConfig {
            max_finished_workflows: Some(1),
            ..EngineConfig::immediate()
        };
        let engine = WorkflowEngine::simulated(EventBus::new(), config);

        let first = engine.create_workflow(linear_spec()).unwrap().workflow_id;
        let second = engine.create_workflow(linear_spec()).unwrap().workflow_id;
        let pending = engine.create_workflow(linear_spec()).unwrap().workflow_id;

        engine.execute_workflow(&first).await;
        engine.execute_workflow(&second).await;

        assert!(engine.get_workflow(&first).is_none());
        assert!(engine.get_workflow(&second).is_some());
        assert!(engine.get_workflow(&pending).is_some());
        assert_eq!(engine.workflow_count(), 2);
    }

    #[tokio::test]
    async fn eviction_follows_finish_order() {
        let bus = EventBus::new();
        let config = EngineConfig {
            max_finished_workflows: Some(1),
            ..EngineConfig::immediate()
        };
        let engine = WorkflowEngine::simulated(bus.clone(), config);

        let observed: Arc<Mutex<Vec<Option<WorkflowStatus>>>> = Arc::default();
        let sink = Arc::clone(&observed);
        let watcher = Arc::clone(&engine);
        bus.subscribe(event_types::WORKFLOW_COMPLETED, move |e: &Event| {
            let status = e
                .payload
                .workflow_id()
                .and_then(|id| watcher.get_workflow(id))
                .map(|wf| wf.status);
            sink.lock().unwrap().push(status);
            Ok(())
        });

        let older = engine.create_workflow(linear_spec()).unwrap().workflow_id;
        let newer = engine.create_workflow(linear_spec()).unwrap().workflow_id;

        assert_eq!(engine.execute_workflow(&newer).await, ExecutionOutcome::Completed);
        assert_eq!(engine.execute_workflow(&older).await, ExecutionOutcome::Completed);

        assert_eq!(engine.get_workflow(&older).unwrap().status, WorkflowStatus::Completed);
        assert!(engine.get_workflow(&newer).is_none());
        assert_eq!(
            *observed.lock().unwrap(),
            vec![Some(WorkflowStatus::Completed), Some(WorkflowStatus::Completed)]
        );
    }

    #[tokio::test]
    async fn zero_limit_still_keeps_the_latest_finished_workflow() {
        let config = EngineConfig {
            max_finished_workflows: Some(0),
            ..EngineConfig::immediate()
        };
        let engine = WorkflowEngine::simulated(EventBus::new(), config);
        let first = engine.create_workflow(linear_spec()).unwrap().workflow_id;
        let second = engine.create_workflow(linear_spec()).unwrap().workflow_id;

        engine.execute_workflow(&first).await;
        assert!(engine.get_workflow(&first).is_some());

        engine.execute_workflow(&second).await;
        assert!(engine.get_workflow(&first).is_none());
        assert!(engine.get_workflow(&second).is_some());
    }

    // ── Bindings ─────────────────────────────────────────────────────────────

    struct LinearTemplate;

    impl WorkflowTemplate for LinearTemplate {
        fn name(&self) -> &str {
            "linear"
        }

        fn instantiate(&self, _event: &Event) -> NexusResult<WorkflowSpec> {
            Ok(linear_spec())
        }
    }

    #[tokio::test]
    async fn bound_event_launches_workflow() {
        let bus = EventBus::new();
        let engine = engine(&bus);
        let mut registry = TemplateRegistry::new();
        registry.register(LinearTemplate);
        engine
            .bind_templates(Arc::new(registry), &[EventBinding::new("thing.happened", "linear")])
            .unwrap();

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        bus.subscribe(event_types::WORKFLOW_COMPLETED, move |e: &Event| {
            let _ = tx.send(e.clone());
            Ok(())
        });

        engine.trigger_event("thing.happened", EventPayload::empty());

        let completed = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("workflow should complete")
            .expect("channel open");
        let id = completed.payload.workflow_id().cloned().unwrap();
        assert_eq!(engine.get_workflow(&id).unwrap().status, WorkflowStatus::Completed);
    }

    #[test]
    fn binding_to_unknown_template_is_rejected() {
        let bus = EventBus::new();
        let engine = engine(&bus);

        let result = engine.bind_templates(
            Arc::new(TemplateRegistry::new()),
            &[EventBinding::new("thing.happened", "nope")],
        );

        assert!(matches!(result, Err(NexusError::UnknownTemplate { .. })));
        assert_eq!(bus.subscriber_count("thing.happened"), 0);
    }

    #[test]
    fn unbind_removes_handlers() {
        let bus = EventBus::new();
        let engine = engine(&bus);
        let mut registry = TemplateRegistry::new();
        registry.register(LinearTemplate);
        engine
            .bind_templates(Arc::new(registry), &[EventBinding::new("thing.happened", "linear")])
            .unwrap();
        assert_eq!(bus.subscriber_count("thing.happened"), 1);

        engine.unbind_templates();
        assert_eq!(bus.subscriber_count("thing.happened"), 0);
    }

    #[test]
    fn launch_without_runtime_leaves_workflow_pending() {
        let engine = engine(&EventBus::new());
        let id = engine.launch(linear_spec()).unwrap();
        assert_eq!(engine.get_workflow(&id).unwrap().status, WorkflowStatus::Pending);
    }
}
