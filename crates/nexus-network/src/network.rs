//! Wiring for a complete network instance.
//!
//! `Network::bootstrap` builds every service from one `NetworkConfig` and
//! owns them; nothing here is global. Services that react to the bus (the
//! registry, the monitor, and the template bindings) are attached during
//! bootstrap and detached by `shutdown`.

use std::sync::Arc;

use tracing::info;

use nexus_contracts::{
    error::NexusResult,
    event::{Event, EventPayload},
};
use nexus_core::{EventBus, Subscription, TemplateRegistry, WorkflowEngine};
use nexus_monitor::PerformanceMonitor;
use nexus_policy::{EthicsValidator, MessageBuilder};
use nexus_router::AgentRouter;

use crate::{
    alex::{Alex, ChatMessage},
    config::NetworkConfig,
    orchestrator::OrchestrationService,
    registry::{AgentRegistry, NetworkSnapshot},
    templates,
};

pub struct Network {
    config: NetworkConfig,
    bus: EventBus,
    registry: AgentRegistry,
    engine: Arc<WorkflowEngine>,
    templates: Arc<TemplateRegistry>,
    orchestrator: OrchestrationService,
    alex: Alex,
    subscriptions: Vec<Subscription>,
}

impl Network {
    /// Build a network whose chat front reads its API key from the
    /// environment variable named in `config.alex`.
    pub fn bootstrap(config: NetworkConfig) -> NexusResult<Self> {
        let alex = Alex::from_config(config.alex.clone());
        Self::with_alex(config, alex)
    }

    /// Build a network around an already constructed chat front.
    ///
    /// # Errors
    ///
    /// Fails if the built-in roster, routing table, or ethics rules do not
    /// load, or a binding names an unknown template.
    pub fn with_alex(config: NetworkConfig, alex: Alex) -> NexusResult<Self> {
        let bus = EventBus::with_config(&config.bus);

        let registry = AgentRegistry::builtin()?;
        let monitor = PerformanceMonitor::new(config.monitor.clone());
        let mut subscriptions = registry.attach(&bus);
        subscriptions.extend(monitor.attach(&bus));

        let engine = WorkflowEngine::simulated(bus.clone(), config.engine.clone());
        let templates = Arc::new(templates::builtin_registry());
        let bindings = config.effective_bindings();
        engine.bind_templates(Arc::clone(&templates), &bindings)?;

        let orchestrator = OrchestrationService::new(
            AgentRouter::builtin()?,
            MessageBuilder::new(config.policy.clone()),
            EthicsValidator::builtin()?,
            monitor,
            Arc::clone(&engine),
        );

        info!(
            agents = registry.len(),
            bindings = bindings.len(),
            demo_mode = alex.is_demo_mode(),
            "network bootstrapped"
        );

        Ok(Self {
            config,
            bus,
            registry,
            engine,
            templates,
            orchestrator,
            alex,
            subscriptions,
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &Arc<WorkflowEngine> {
        &self.engine
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn orchestrator(&self) -> &OrchestrationService {
        &self.orchestrator
    }

    pub fn monitor(&self) -> &PerformanceMonitor {
        self.orchestrator.monitor()
    }

    pub fn alex(&self) -> &Alex {
        &self.alex
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        self.registry.snapshot()
    }

    /// Publish an external event; bound templates react to it.
    pub fn publish(&self, event_type: &str, payload: EventPayload) -> Event {
        self.engine.trigger_event(event_type, payload)
    }

    /// One chat turn with Alex against the live network state.
    pub async fn chat(&self, history: &[ChatMessage], input: &str) -> String {
        self.alex.send_message(history, input, &self.snapshot()).await
    }

    pub async fn resolve_conflict(&self, description: &str) -> String {
        self.alex.resolve_conflict(description).await
    }

    /// Detach every bus subscription installed by bootstrap. Idempotent.
    pub fn shutdown(&self) {
        self.engine.unbind_templates();
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
        info!("network shut down");
    }
}
