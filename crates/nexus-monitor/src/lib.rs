//! # nexus-monitor
//!
//! Per-agent performance tracking for the NEXUS agent network.
//!
//! [`PerformanceMonitor`] folds each tracked call into a running mean of
//! latency and success rate, and reports watch-listed agents whose mean
//! latency crosses a threshold. Attach it to an `EventBus` to track workflow
//! steps without any caller involvement.

pub mod monitor;

pub use monitor::{AgentMetrics, MonitorConfig, PerformanceMonitor};
