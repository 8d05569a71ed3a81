//! # nexus-network
//!
//! The reference NEXUS agent network, assembled from the runtime crates.
//!
//! - [`roster`] and [`registry`]: twelve departments and sixty-eight agents,
//!   with live status mirrored from workflow step events
//! - [`templates`]: the four canonical event-triggered workflows
//! - [`alex`] and [`gemini`]: the chat front and its completion backend
//! - [`orchestrator`]: task routing, message validation, and health
//! - [`network`]: `Network::bootstrap`, which owns one instance of all of
//!   the above
//! - [`scenarios`]: runnable walkthroughs used by the demo binary

pub mod alex;
pub mod config;
pub mod gemini;
pub mod network;
pub mod orchestrator;
pub mod registry;
pub mod roster;
pub mod scenarios;
pub mod templates;

pub use alex::{Alex, AlexConfig, ChatMessage, ChatRole};
pub use config::NetworkConfig;
pub use network::Network;
pub use orchestrator::{OrchestrationService, RoutedTask, SystemHealth};
pub use registry::{AgentRegistry, NetworkSnapshot};

// ── Tests ─────────────────────────────────────────────────────────────────────
