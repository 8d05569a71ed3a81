//! Scenario 3: Strategic Planning
//!
//! A planning request carries its goal in the payload; the roadmap step runs
//! first, four reviews run side by side, and Alex synthesises the plan.

use serde_json::json;

use nexus_contracts::{
    error::NexusResult,
    event::{event_types, EventPayload},
};

use super::{print_workflow, trigger_and_wait};
use crate::{config::NetworkConfig, network::Network};

pub async fn run_scenario(config: &NetworkConfig) -> NexusResult<()> {
    println!("=== Scenario 3: Strategic Planning ===");
    println!();

    let network = Network::bootstrap(config.clone())?;

    let goal = "Open a residential retreat programme in Luang Prabang";
    let payload = EventPayload::StrategicPlanning {
        goal: goal.to_string(),
        requirements: json!({ "horizon_months": 18, "budget_usd": 250000 }),
    };
    println!("  Goal: {}", goal);
    let workflow =
        trigger_and_wait(&network, event_types::STRATEGIC_PLANNING_REQUESTED, payload).await?;
    print_workflow(&workflow);

    let health = network.orchestrator().system_health();
    println!();
    println!("  Active workflows after completion: {}", health.total_active_workflows);

    network.shutdown();
    println!();
    Ok(())
}
