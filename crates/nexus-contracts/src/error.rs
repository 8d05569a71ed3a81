//! Error types for the NEXUS orchestration core.
//!
//! Construction-time problems (bad workflow definitions, bad configuration,
//! inconsistent registries) surface as `NexusError`. Runtime paths that must
//! stay live (event delivery, workflow execution, chat) log these errors and
//! fall back to a safe default instead of returning them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NexusError {
    /// No workflow is registered under the given id.
    #[error("workflow '{workflow_id}' not found")]
    WorkflowNotFound { workflow_id: String },

    /// A workflow definition is structurally invalid.
    #[error("invalid workflow: {reason}")]
    InvalidWorkflow { reason: String },

    /// A step's trigger expression could not be parsed.
    #[error("invalid trigger '{trigger}' on step {step}: {reason}")]
    InvalidTrigger {
        step: u32,
        trigger: String,
        reason: String,
    },

    /// No template is registered under the given name.
    #[error("unknown workflow template '{name}'")]
    UnknownTemplate { name: String },

    /// An agent id does not resolve in the registry.
    #[error("unknown agent '{agent_id}'")]
    UnknownAgent { agent_id: String },

    /// An agent references a department that does not exist.
    #[error("agent '{agent_id}' references unknown department '{department_id}'")]
    UnknownDepartment {
        agent_id: String,
        department_id: String,
    },

    /// An event handler reported a failure.
    #[error("event handler failed: {reason}")]
    HandlerFailed { reason: String },

    /// A workflow step could not be carried out.
    #[error("step {step} failed: {reason}")]
    StepFailed { step: u32, reason: String },

    /// The external completion service failed or is not configured.
    #[error("completion request failed: {reason}")]
    CompletionFailed { reason: String },

    /// A configuration document is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the NEXUS crates.
pub type NexusResult<T> = Result<T, NexusError>;
