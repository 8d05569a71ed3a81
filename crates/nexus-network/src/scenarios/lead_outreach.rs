//! Scenario 1: Lead to Outreach
//!
//! A `lead.discovered` event launches the six-step sales workflow. Step 6
//! (`step:5:approved`) passes through the approval gate before the message
//! is sent. Afterwards the registry shows every agent back at `Idle` and the
//! monitor holds one record per step.

use serde_json::{json, Map};

use nexus_contracts::{
    agent::AgentId,
    error::NexusResult,
    event::{event_types, EventPayload},
};

use super::{print_workflow, trigger_and_wait};
use crate::{config::NetworkConfig, network::Network};

pub async fn run_scenario(config: &NetworkConfig) -> NexusResult<()> {
    println!("=== Scenario 1: Lead to Outreach ===");
    println!();

    let network = Network::bootstrap(config.clone())?;

    let mut details = Map::new();
    details.insert("name".to_string(), json!("Somsack V."));
    details.insert("source".to_string(), json!("retreat waitlist"));
    let payload = EventPayload::Lead {
        lead_id: "L-2041".to_string(),
        details,
    };

    println!("  Event: {} (lead L-2041)", event_types::LEAD_DISCOVERED);
    let workflow = trigger_and_wait(&network, event_types::LEAD_DISCOVERED, payload).await?;
    print_workflow(&workflow);
    println!();

    let messenger = AgentId::from("agent-013");
    if let Some(metrics) = network.monitor().agent_metrics(&messenger) {
        println!(
            "  Messenger (agent-013): {} step(s), {:.0}% success, {:.0}ms avg",
            metrics.total_messages, metrics.success_rate, metrics.avg_response_time
        );
    }
    let snapshot = network.snapshot();
    println!(
        "  Network: {}/{} agents working, alignment {:.1}%",
        snapshot.working_agents, snapshot.total_agents, snapshot.overall_alignment
    );

    network.shutdown();
    println!();
    Ok(())
}
