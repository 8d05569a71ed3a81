//! Top-level network configuration.
//!
//! ```toml
//! [bus]
//! history_capacity = 10000
//!
//! [engine]
//! step_delay_ms = 500
//! execution_mode = "dependency"
//!
//! [monitor]
//! watch_list = ["agent-001", "agent-004"]
//! latency_threshold_ms = 5000.0
//!
//! [alex]
//! model = "gemini-2.5-flash"
//!
//! [policy]
//! approval_amount_threshold = 1000.0
//!
//! [[bindings]]
//! event = "lead.discovered"
//! template = "lead-to-outreach"
//! ```
//!
//! Every section is optional. With no `[[bindings]]` the four canonical
//! bindings apply.

use std::path::Path;

use serde::{Deserialize, Serialize};

use nexus_contracts::error::{NexusError, NexusResult};
use nexus_core::{
    config::{BusConfig, EngineConfig},
    template::EventBinding,
};
use nexus_monitor::MonitorConfig;
use nexus_policy::MessagePolicy;

use crate::{alex::AlexConfig, templates};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub bus: BusConfig,
    pub engine: EngineConfig,
    pub monitor: MonitorConfig,
    pub alex: AlexConfig,
    /// Flag derivation for messages built by the orchestrator.
    pub policy: MessagePolicy,
    pub bindings: Vec<EventBinding>,
}

impl NetworkConfig {
    pub fn from_toml_str(s: &str) -> NexusResult<Self> {
        toml::from_str(s).map_err(|e| NexusError::ConfigError {
            reason: format!("failed to parse network TOML: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> NexusResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| NexusError::ConfigError {
            reason: format!("failed to read network config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Configured bindings, or the canonical ones when none are given.
    pub fn effective_bindings(&self) -> Vec<EventBinding> {
        if self.bindings.is_empty() {
            templates::default_bindings()
        } else {
            self.bindings.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use nexus_contracts::error::NexusError;
    use nexus_core::config::ExecutionMode;

    use super::NetworkConfig;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = NetworkConfig::from_toml_str("").unwrap();
        assert_eq!(config, NetworkConfig::default());
        assert_eq!(config.effective_bindings().len(), 4);
        assert_eq!(config.alex.history_window, 6);
    }

    #[test]
    fn sections_override_independently() {
        let config = NetworkConfig::from_toml_str(
            r#"
            [bus]
            history_capacity = 50

            [engine]
            step_delay_ms = 0
            execution_mode = "sequential"

            [monitor]
            latency_threshold_ms = 800.0

            [alex]
            temperature = 0.2
            api_key_env = "NEXUS_GEMINI_KEY"

            [policy]
            approval_amount_threshold = 250.0
            legal_keywords = ["contract", "waiver"]

            [[bindings]]
            event = "retreat.booked"
            template = "stress-to-healing"
            "#,
        )
        .unwrap();

        assert_eq!(config.bus.history_capacity, Some(50));
        assert_eq!(config.engine.execution_mode, ExecutionMode::Sequential);
        assert_eq!(config.monitor.latency_threshold_ms, 800.0);
        assert_eq!(config.monitor.watch_list.len(), 5);
        assert_eq!(config.alex.model, "gemini-2.5-flash");
        assert_eq!(config.alex.api_key_env, "NEXUS_GEMINI_KEY");
        assert_eq!(config.policy.approval_amount_threshold, 250.0);
        assert_eq!(config.policy.legal_keywords, vec!["contract", "waiver"]);
        assert_eq!(config.policy.default_ttl_secs, 3600);

        let bindings = config.effective_bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].event, "retreat.booked");
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        match NetworkConfig::from_toml_str("[engine]\nstep_delay_ms = \"fast\"") {
            Err(NexusError::ConfigError { reason }) => {
                assert!(reason.starts_with("failed to parse network TOML"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_a_config_error() {
        assert!(matches!(
            NetworkConfig::from_file(Path::new("/nonexistent/nexus.toml")),
            Err(NexusError::ConfigError { .. })
        ));
    }
}
