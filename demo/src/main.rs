//! NEXUS Agent Network demo CLI
//!
//! Runs the reference network scenarios, or one operation against a freshly
//! bootstrapped network.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- lead-outreach
//!   cargo run -p demo -- route "Plan the Lao market launch"
//!   cargo run -p demo -- scan "Limited time only!" --market lao
//!   cargo run -p demo -- trigger stress.detected
//!   cargo run -p demo -- chat "How is the network doing?"
//!   cargo run -p demo -- --config nexus.toml run-all

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use nexus_contracts::{
    error::{NexusError, NexusResult},
    event::EventPayload,
    message::MessageContext,
};
use nexus_network::{
    scenarios::{
        self, alex_chat, content_pipeline, ethics_scan, healing_protocol, lead_outreach,
        strategic_planning, task_routing,
    },
    Network, NetworkConfig,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// NEXUS: a 68-agent network orchestrated by events and workflows.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "NEXUS agent network demo",
    long_about = "Runs NEXUS demo scenarios showing event-triggered workflows,\n\
                  task routing, ethics enforcement, and the Alex chat front."
)]
struct Cli {
    /// Network configuration file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all seven scenarios in sequence.
    RunAll,
    /// Scenario 1: lead.discovered → Lead to Outreach.
    LeadOutreach,
    /// Scenario 2: stress.detected → Stress to Healing Protocol.
    HealingProtocol,
    /// Scenario 3: strategic.planning.requested → Strategic Planning.
    StrategicPlanning,
    /// Scenario 4: content.creation.requested, visual and text.
    ContentPipeline,
    /// Scenario 5: keyword routing and planning workflows.
    TaskRouting,
    /// Scenario 6: content scans and message validation.
    EthicsScan,
    /// Scenario 7: chat turns and conflict resolution.
    AlexChat,
    /// Route one task and print the resulting messages.
    Route {
        task: String,
        /// JSON object attached to each message.
        #[arg(long)]
        context: Option<String>,
    },
    /// Scan one piece of content against the ethics rules.
    Scan {
        content: String,
        /// Target market, e.g. "lao".
        #[arg(long)]
        market: Option<String>,
    },
    /// Publish an event and wait for the workflow it launches.
    Trigger {
        event_type: String,
        /// Event payload as JSON; a `kind` field selects a typed payload.
        #[arg(long)]
        payload: Option<String>,
    },
    /// Send one message to Alex.
    Chat { message: String },
    /// Ask Alex for a conflict resolution proposal.
    Resolve { description: String },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match load_config(cli.config.as_ref()) {
        Ok(config) => run(cli.command, &config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            println!("Done.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> NexusResult<NetworkConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading network config");
            NetworkConfig::from_file(path)
        }
        None => Ok(NetworkConfig::default()),
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

async fn run(command: Command, config: &NetworkConfig) -> NexusResult<()> {
    match command {
        Command::RunAll => run_all(config).await,
        Command::LeadOutreach => lead_outreach::run_scenario(config).await,
        Command::HealingProtocol => healing_protocol::run_scenario(config).await,
        Command::StrategicPlanning => strategic_planning::run_scenario(config).await,
        Command::ContentPipeline => content_pipeline::run_scenario(config).await,
        Command::TaskRouting => task_routing::run_scenario(config).await,
        Command::EthicsScan => ethics_scan::run_scenario(config).await,
        Command::AlexChat => alex_chat::run_scenario(config).await,
        Command::Route { task, context } => route(config, &task, context.as_deref()),
        Command::Scan { content, market } => scan(config, &content, market),
        Command::Trigger { event_type, payload } => {
            trigger(config, &event_type, payload.as_deref()).await
        }
        Command::Chat { message } => {
            let network = Network::bootstrap(config.clone())?;
            println!("{}", network.chat(&[], &message).await);
            Ok(())
        }
        Command::Resolve { description } => {
            let network = Network::bootstrap(config.clone())?;
            println!("{}", network.resolve_conflict(&description).await);
            Ok(())
        }
    }
}

async fn run_all(config: &NetworkConfig) -> NexusResult<()> {
    lead_outreach::run_scenario(config).await?;
    healing_protocol::run_scenario(config).await?;
    strategic_planning::run_scenario(config).await?;
    content_pipeline::run_scenario(config).await?;
    task_routing::run_scenario(config).await?;
    ethics_scan::run_scenario(config).await?;
    alex_chat::run_scenario(config).await?;
    Ok(())
}

fn route(config: &NetworkConfig, task: &str, context: Option<&str>) -> NexusResult<()> {
    let context = context.map(|raw| parse_json(raw, "--context")).transpose()?;
    let network = Network::bootstrap(config.clone())?;
    let routed = network.orchestrator().route_task(task, context.as_ref())?;

    println!("Task: {}", task);
    for message in &routed.messages {
        println!(
            "  {} -> {}  ethics_check={} human_approval={} valid={}",
            message.from_agent,
            message.to_agent,
            message.ethics_check,
            message.requires_human_approval,
            network.orchestrator().validate_message(message)
        );
    }
    if let Some(workflow) = &routed.workflow {
        println!("Created workflow (pending):");
        scenarios::print_workflow(workflow);
    }
    Ok(())
}

fn scan(config: &NetworkConfig, content: &str, market: Option<String>) -> NexusResult<()> {
    let network = Network::bootstrap(config.clone())?;
    let context = market.map(MessageContext::for_market).unwrap_or_default();
    let report = network.orchestrator().validator().scan_content(content, &context);

    println!("Passed:   {}", report.passed);
    println!("Severity: {:?}", report.severity);
    for violation in &report.violations {
        println!("  - {}", violation);
    }
    if let Some(corrections) = &report.corrections {
        println!("{}", corrections);
    }
    Ok(())
}

async fn trigger(config: &NetworkConfig, event_type: &str, payload: Option<&str>) -> NexusResult<()> {
    let payload = match payload {
        Some(raw) => event_payload(parse_json(raw, "--payload")?),
        None => EventPayload::empty(),
    };
    let network = Network::bootstrap(config.clone())?;
    let workflow = scenarios::trigger_and_wait(&network, event_type, payload).await?;
    scenarios::print_workflow(&workflow);
    network.shutdown();
    Ok(())
}

fn parse_json(raw: &str, flag: &str) -> NexusResult<Value> {
    serde_json::from_str(raw).map_err(|e| NexusError::ConfigError {
        reason: format!("{} is not valid JSON: {}", flag, e),
    })
}

/// A typed payload when `value` carries a known `kind`, otherwise open data.
fn event_payload(value: Value) -> EventPayload {
    match serde_json::from_value::<EventPayload>(value.clone()) {
        Ok(payload) => payload,
        Err(_) => match value {
            Value::Object(fields) => EventPayload::Data { fields },
            _ => EventPayload::empty(),
        },
    }
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("NEXUS: Conscious Agent Network");
    println!("Reference Demo");
    println!("===============================");
    println!();
    println!("Event-triggered workflow pipeline:");
    println!("  [1] An external event is published on the bus");
    println!("  [2] Its bound template builds a workflow; the engine validates the step graph");
    println!("  [3] Steps run in dependency waves; approval-gated steps pass the approval gate");
    println!("  [4] Every step publishes started/completed events");
    println!("  [5] The registry and performance monitor follow those events");
    println!();
}
