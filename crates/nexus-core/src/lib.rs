//! # nexus-core
//!
//! The orchestration runtime for the NEXUS agent network.
//!
//! This crate provides:
//! - The seam traits (`EventHandler`, `StepExecutor`, `ApprovalGate`,
//!   `WorkflowTemplate`, `CompletionClient`)
//! - The in-process `EventBus` with wildcard delivery and bounded history
//! - The `WorkflowEngine`, which schedules steps by their trigger
//!   dependencies and publishes lifecycle events on the bus
//! - The template registry that binds event types to workflow factories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nexus_core::{EventBus, WorkflowEngine, config::EngineConfig};
//!
//! let bus = EventBus::new();
//! let engine = WorkflowEngine::simulated(bus.clone(), EngineConfig::default());
//! let workflow = engine.create_workflow(spec)?;
//! engine.execute_workflow(&workflow.workflow_id).await;
//! ```

pub mod bus;
pub mod config;
pub mod engine;
pub mod schedule;
pub mod template;
pub mod traits;

pub use bus::{EventBus, Subscription};
pub use engine::WorkflowEngine;
pub use template::TemplateRegistry;
