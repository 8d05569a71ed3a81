//! Workflow template registry and event bindings.
//!
//! A `TemplateRegistry` maps template names to `WorkflowTemplate` factories.
//! An `EventBinding` says which template to instantiate when an event type is
//! observed on the bus. Bindings are data, read from the `[[bindings]]`
//! tables of the network configuration:
//!
//! ```toml
//! [[bindings]]
//! event = "lead.discovered"
//! template = "lead-to-outreach"
//! ```

use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};

use nexus_contracts::{
    error::{NexusError, NexusResult},
    event::Event,
    workflow::WorkflowSpec,
};

use crate::traits::WorkflowTemplate;

#[derive(Default, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<String, Arc<dyn WorkflowTemplate>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `template` under its own name, replacing any previous one.
    pub fn register(&mut self, template: impl WorkflowTemplate + 'static) {
        self.templates
            .insert(template.name().to_string(), Arc::new(template));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn WorkflowTemplate>> {
        self.templates.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered template names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.keys().cloned().collect();
        names.sort();
        names
    }

    /// Build the workflow definition that `name` produces for `event`.
    pub fn instantiate(&self, name: &str, event: &Event) -> NexusResult<WorkflowSpec> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| NexusError::UnknownTemplate {
                name: name.to_string(),
            })?;
        template.instantiate(event)
    }
}

/// One event-type → template-name binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBinding {
    pub event: String,
    pub template: String,
}

impl EventBinding {
    pub fn new(event: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            template: template.into(),
        }
    }
}
