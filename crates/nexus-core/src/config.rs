//! Bus and engine configuration.
//!
//! Both sections deserialize from TOML with every field optional, so an
//! empty table yields the defaults.
//!
//! ```toml
//! [bus]
//! history_capacity = 10000
//!
//! [engine]
//! step_delay_ms = 500
//! execution_mode = "dependency"
//! max_finished_workflows = 256
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Keep at most this many events in history, dropping the oldest.
    /// `None` keeps everything until `clear_history`.
    pub history_capacity: Option<usize>,
}

/// How the engine orders the steps of a workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Honour trigger dependencies; steps with no unmet dependency run
    /// concurrently.
    #[default]
    Dependency,
    /// Run steps one at a time in declaration order; triggers are descriptive.
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulated latency of one step, in milliseconds. Zero disables it.
    pub step_delay_ms: u64,
    pub execution_mode: ExecutionMode,
    /// Keep at most this many completed/failed workflows, evicting the
    /// oldest. `None` retains them all.
    pub max_finished_workflows: Option<usize>,
}

impl EngineConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Defaults with the simulated delay switched off.
    pub fn immediate() -> Self {
        Self {
            step_delay_ms: 0,
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 500,
            execution_mode: ExecutionMode::Dependency,
            max_finished_workflows: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_engine_table_uses_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.step_delay(), Duration::from_millis(500));
    }

    #[test]
    fn execution_mode_reads_snake_case() {
        let config: EngineConfig = toml::from_str(
            r#"
            step_delay_ms = 0
            execution_mode = "sequential"
            max_finished_workflows = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.execution_mode, ExecutionMode::Sequential);
        assert_eq!(config.max_finished_workflows, Some(4));
        assert!(config.step_delay().is_zero());
    }

    #[test]
    fn bus_defaults_to_unbounded_history() {
        let config: BusConfig = toml::from_str("").unwrap();
        assert_eq!(config.history_capacity, None);
    }
}
