//! Scenario 6: Ethics Scan
//!
//! Sample copy is scanned against the built-in rule set, with and without a
//! Lao market context, then the same rules gate outgoing messages.

use serde_json::json;

use nexus_contracts::{
    agent::AgentId,
    error::NexusResult,
    message::{MessageContext, MessageData},
};

use crate::{config::NetworkConfig, network::Network};

pub async fn run_scenario(config: &NetworkConfig) -> NexusResult<()> {
    println!("=== Scenario 6: Ethics Scan ===");
    println!();

    let network = Network::bootstrap(config.clone())?;
    let orchestrator = network.orchestrator();
    let validator = orchestrator.validator();

    let samples = [
        ("Join our gentle full-moon meditation this Friday.", MessageContext::default()),
        ("Limited time only! Act now or lose your place.", MessageContext::default()),
        ("Your destiny is to meet your twin flame in June.", MessageContext::default()),
        ("We bring wellness to primitive mountain villages.", MessageContext::default()),
        ("We bring wellness to primitive mountain villages.", MessageContext::for_market("lao")),
    ];

    println!("  Content scans:");
    for (content, context) in &samples {
        let report = validator.scan_content(content, context);
        let market = context.target_market.as_deref().unwrap_or("-");
        println!(
            "    [{}] market={:<4} severity={:?}  \"{}\"",
            if report.passed { "PASS" } else { "FAIL" },
            market,
            report.severity,
            content
        );
        if let Some(corrections) = &report.corrections {
            println!("           {}", corrections);
        }
    }
    println!();

    println!("  Message validation:");
    let alex = AgentId::from("agent-001");
    let messenger = AgentId::from("agent-013");
    let messages = [
        orchestrator.builder().request(
            alex.clone(),
            messenger.clone(),
            "Send outreach email",
            MessageData::default().with_field("body", json!("Spaces are open for the autumn retreat.")),
        ),
        orchestrator.builder().request(
            alex.clone(),
            messenger.clone(),
            "Send outreach email",
            MessageData::default().with_field("body", json!("Once in a lifetime offer, you must buy today.")),
        ),
        orchestrator.builder().request(
            alex.clone(),
            AgentId::from("agent-026"),
            "Summarise survey results",
            MessageData::default().with_field("note", json!("act now or lose the dataset")),
        ),
    ];
    for message in &messages {
        println!(
            "    {:<26} ethics_check={:<5} valid={}",
            message.payload.action,
            message.ethics_check,
            orchestrator.validate_message(message)
        );
    }

    network.shutdown();
    println!();
    Ok(())
}
