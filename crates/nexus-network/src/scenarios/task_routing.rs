//! Scenario 5: Task Routing
//!
//! Free-text tasks are routed by keyword, Aegis is copied in on sensitive
//! topics, and each routed agent gets a request from Alex carrying the
//! advisory ethics and approval flags. Broad or planning tasks also get a
//! pending strategic-planning workflow.

use serde_json::json;

use nexus_contracts::error::NexusResult;

use crate::{config::NetworkConfig, network::Network};

pub async fn run_scenario(config: &NetworkConfig) -> NexusResult<()> {
    println!("=== Scenario 5: Task Routing ===");
    println!();

    let network = Network::bootstrap(config.clone())?;
    let orchestrator = network.orchestrator();

    let tasks = [
        ("Follow up with the lead from the sound healing workshop", None),
        ("Write an SEO blog post on breathwork", None),
        (
            "Sign the venue contract for the Vientiane retreat",
            Some(json!({ "amount": 4200.0, "targetMarket": "lao" })),
        ),
        ("Plan the Lao market launch with new pricing", None),
        ("Water the office ferns", None),
    ];

    for (task, context) in &tasks {
        let routed = orchestrator.route_task(task, context.as_ref())?;
        let agents: Vec<&str> = routed.agents.iter().map(|a| a.as_str()).collect();
        println!("  Task: {}", task);
        println!("    Agents:   {}", agents.join(", "));
        for message in &routed.messages {
            println!(
                "    -> {:<10} ethics_check={:<5} human_approval={}",
                message.to_agent, message.ethics_check, message.requires_human_approval
            );
        }
        if let Some(workflow) = &routed.workflow {
            println!("    Workflow: {} [{}] ({})", workflow.name, workflow.status, workflow.workflow_id);
        }
        println!();
    }

    let health = orchestrator.system_health();
    println!("  Pending planning workflows: {}", health.total_active_workflows);
    if let Some(dept) = network.registry().department("dept-05") {
        println!(
            "  {} hub: {}",
            dept.name,
            orchestrator.router().department_hub(dept.id.as_str())
        );
    }

    network.shutdown();
    println!();
    Ok(())
}
