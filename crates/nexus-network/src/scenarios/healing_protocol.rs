//! Scenario 2: Stress to Healing Protocol
//!
//! A `stress.detected` event fans out to three specialists after Alex is
//! alerted. Steps 2, 3, and 4 share `parallel:1` and run in the same wave;
//! the timeline printed below shows them starting together. Step 6 is a
//! human sign-off, so its agent id is not part of the registry.

use chrono::{DateTime, Utc};

use nexus_contracts::{
    error::NexusResult,
    event::{event_types, EventPayload},
};

use super::{print_workflow, trigger_and_wait};
use crate::{config::NetworkConfig, network::Network};

pub async fn run_scenario(config: &NetworkConfig) -> NexusResult<()> {
    println!("=== Scenario 2: Stress to Healing Protocol ===");
    println!();

    let network = Network::bootstrap(config.clone())?;

    let payload = EventPayload::Stress {
        source: Some("wearable".to_string()),
        level: Some("elevated".to_string()),
    };
    println!("  Event: {} (wearable, elevated)", event_types::STRESS_DETECTED);
    let workflow = trigger_and_wait(&network, event_types::STRESS_DETECTED, payload).await?;
    print_workflow(&workflow);
    println!();

    println!("  Step timeline:");
    let step_events: Vec<_> = network
        .bus()
        .history(None)
        .into_iter()
        .filter(|e| {
            e.event_type == event_types::WORKFLOW_STEP_STARTED
                || e.event_type == event_types::WORKFLOW_STEP_COMPLETED
        })
        .filter(|e| e.payload.workflow_id() == Some(&workflow.workflow_id))
        .collect();
    let origin: Option<DateTime<Utc>> = step_events.first().map(|e| e.timestamp);
    for event in &step_events {
        if let (Some(origin), EventPayload::WorkflowStep { step, agent, .. }) = (origin, &event.payload) {
            let offset = (event.timestamp - origin).num_milliseconds();
            println!("    +{:>5}ms  {:<24} step {} ({})", offset, event.event_type, step, agent);
        }
    }

    network.shutdown();
    println!();
    Ok(())
}
