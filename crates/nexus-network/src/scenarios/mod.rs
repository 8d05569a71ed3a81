//! Network demo scenarios.
//!
//! Each scenario bootstraps its own `Network` from the given configuration
//! and walks through one pattern: an event-triggered workflow, task routing,
//! ethics enforcement, or the chat front.

pub mod alex_chat;
pub mod content_pipeline;
pub mod ethics_scan;
pub mod healing_protocol;
pub mod lead_outreach;
pub mod strategic_planning;
pub mod task_routing;

use std::time::Duration;

use nexus_contracts::{
    error::{NexusError, NexusResult},
    event::{event_types, EventPayload},
    workflow::{Workflow, WorkflowId},
};
use nexus_core::WorkflowEngine;

use crate::network::Network;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const WAIT_LIMIT: Duration = Duration::from_secs(30);

/// Publish `event_type` and wait for the workflow it launches to finish.
pub async fn trigger_and_wait(
    network: &Network,
    event_type: &str,
    payload: EventPayload,
) -> NexusResult<Workflow> {
    let event = network.publish(event_type, payload);

    let launched = network
        .bus()
        .history(Some(event_types::WORKFLOW_CREATED))
        .into_iter()
        .find(|e| e.timestamp >= event.timestamp)
        .and_then(|e| e.payload.workflow_id().cloned())
        .ok_or_else(|| NexusError::ConfigError {
            reason: format!("event '{}' is not bound to any workflow template", event_type),
        })?;

    wait_for(network.engine(), &launched).await
}

/// Poll until `workflow_id` reaches a terminal status.
pub async fn wait_for(engine: &WorkflowEngine, workflow_id: &WorkflowId) -> NexusResult<Workflow> {
    let poll = async {
        loop {
            match engine.get_workflow(workflow_id) {
                Some(wf) if wf.status.is_terminal() => return Ok(wf),
                Some(_) => tokio::time::sleep(POLL_INTERVAL).await,
                None => {
                    return Err(NexusError::WorkflowNotFound {
                        workflow_id: workflow_id.to_string(),
                    })
                }
            }
        }
    };
    tokio::time::timeout(WAIT_LIMIT, poll)
        .await
        .map_err(|_| NexusError::InvalidWorkflow {
            reason: format!("workflow '{}' did not finish within {:?}", workflow_id, WAIT_LIMIT),
        })?
}

pub fn print_workflow(workflow: &Workflow) {
    println!("  Workflow:    {} ({})", workflow.name, workflow.workflow_id);
    println!("  Description: {}", workflow.description);
    if let Some(coordinator) = &workflow.coordinator {
        println!("  Coordinator: {}", coordinator);
    }
    println!("  Status:      {}", workflow.status);
    for step in &workflow.steps {
        let result = step
            .output
            .as_ref()
            .map_or("(not run)", |o| o.result.as_str());
        println!(
            "    [{}] {:<30} {:<14} {:<24} {}",
            step.step,
            step.action,
            step.agent,
            step.trigger.as_deref().unwrap_or("-"),
            result
        );
    }
}
