//! Scenario 7: Alex Chat
//!
//! Three chat turns and one conflict resolution. Without an API key in the
//! configured environment variable the replies come from demo mode, which
//! still reflects the live network status.

use nexus_contracts::error::NexusResult;

use crate::{alex::ChatMessage, config::NetworkConfig, network::Network};

pub async fn run_scenario(config: &NetworkConfig) -> NexusResult<()> {
    println!("=== Scenario 7: Alex Chat ===");
    println!();

    let network = Network::bootstrap(config.clone())?;
    let mode = if network.alex().is_demo_mode() { "demo" } else { "live" };
    println!("  Mode: {} (model {})", mode, network.alex().config().model);
    println!();

    let mut history: Vec<ChatMessage> = Vec::new();
    for input in [
        "What should we focus on this week?",
        "How is the network doing?",
        "Prepare the team for the retreat launch.",
    ] {
        let reply = network.chat(&history, input).await;
        println!("  USER: {}", input);
        for line in reply.lines() {
            println!("  ALEX: {}", line);
        }
        println!();
        history.push(ChatMessage::user(input));
        history.push(ChatMessage::model(reply));
    }

    let conflict = "Sales Director wants urgency language; Aegis flags it as coercive";
    println!("  Conflict: {}", conflict);
    for line in network.resolve_conflict(conflict).await.lines() {
        println!("  {}", line);
    }

    network.shutdown();
    println!();
    Ok(())
}
