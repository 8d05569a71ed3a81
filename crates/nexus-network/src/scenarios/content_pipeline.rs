//! Scenario 4: Content Creation & Publishing
//!
//! The same template assigns step 1 to the visual designer for visual
//! content and to the copywriter otherwise. Both variants run to completion.

use serde_json::json;

use nexus_contracts::{
    error::NexusResult,
    event::{event_types, ContentType, EventPayload},
};

use super::{print_workflow, trigger_and_wait};
use crate::{config::NetworkConfig, network::Network};

pub async fn run_scenario(config: &NetworkConfig) -> NexusResult<()> {
    println!("=== Scenario 4: Content Creation & Publishing ===");
    println!();

    let network = Network::bootstrap(config.clone())?;

    for (label, content_type) in [("visual", ContentType::Visual), ("text", ContentType::Text)] {
        println!("  Request: {} content", label);
        let payload = EventPayload::ContentCreation {
            content_type,
            specs: json!({ "channel": "instagram", "theme": "full moon ceremony" }),
        };
        let workflow =
            trigger_and_wait(&network, event_types::CONTENT_CREATION_REQUESTED, payload).await?;
        print_workflow(&workflow);
        println!();
    }

    println!("  Workflows run: {}", network.engine().workflow_count());
    network.shutdown();
    println!();
    Ok(())
}
