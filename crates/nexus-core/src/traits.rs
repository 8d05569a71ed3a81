//! Seam traits for the NEXUS orchestration runtime.
//!
//! - `EventHandler`    : a bus subscriber (UI, monitors, workflow bindings)
//! - `StepExecutor`    : performs the work of one workflow step
//! - `ApprovalGate`    : signs off on approval-gated steps
//! - `WorkflowTemplate`: turns a triggering event into a workflow definition
//! - `CompletionClient`: the external language-model backend
//!
//! Handlers and executors are treated as untrusted: the bus and engine catch
//! their failures and keep running.

use async_trait::async_trait;

use nexus_contracts::{
    error::NexusResult,
    event::Event,
    workflow::{StepOutput, Workflow, WorkflowId, WorkflowSpec, WorkflowStep},
};

/// A subscriber to the event bus.
///
/// Returning `Err` is logged by the bus and never reaches the publisher.
/// Any `Fn(&Event) -> NexusResult<()>` closure is a handler.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event) -> NexusResult<()>;
}

impl<F> EventHandler for F
where
    F: Fn(&Event) -> NexusResult<()> + Send + Sync,
{
    fn handle(&self, event: &Event) -> NexusResult<()> {
        self(event)
    }
}

/// Everything a step executor gets to see about the step it runs.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub workflow_id: WorkflowId,
    pub workflow_name: String,
    pub step: WorkflowStep,
}

/// Performs the work assigned to one workflow step.
///
/// The engine calls `execute` once per step, possibly concurrently with other
/// steps of the same dependency wave. An `Err` fails the whole workflow.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(&self, ctx: &StepContext) -> NexusResult<StepOutput>;
}

/// The decision an `ApprovalGate` returns for a gated step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approved,
    Rejected { reason: String },
}

/// Reviews steps whose trigger is `step:N:approved`.
///
/// Called after the step's predecessors have completed and before the step
/// runs. A rejection fails the workflow.
pub trait ApprovalGate: Send + Sync {
    fn review(&self, workflow: &Workflow, step: &WorkflowStep) -> ApprovalDecision;
}

/// A named factory that builds a workflow definition from a triggering event.
pub trait WorkflowTemplate: Send + Sync {
    /// Registry key, e.g. "lead-to-outreach".
    fn name(&self) -> &str;

    /// Build the workflow for `event`. Payload fields may shape the steps.
    fn instantiate(&self, event: &Event) -> NexusResult<WorkflowSpec>;
}

/// A single request to the language-model backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub temperature: f32,
}

/// The external completion service.
///
/// Callers must treat failures as recoverable; the core never depends on this
/// call succeeding.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> NexusResult<String>;
}
