//! # nexus-policy
//!
//! Content and message policy for the NEXUS agent network.
//!
//! ## Overview
//!
//! - [`EthicsValidator`] scans text against an ordered set of keyword checks
//!   loaded from TOML and returns a severity-graded [`ScanReport`].
//! - [`MessageBuilder`] constructs inter-agent messages and derives their
//!   advisory `ethics_check` and `requires_human_approval` flags from a
//!   [`MessagePolicy`].
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use nexus_policy::{EthicsValidator, MessageBuilder};
//!
//! let validator = EthicsValidator::builtin()?;
//! let report = validator.scan_content("Act now or lose your spot", &Default::default());
//! assert!(!report.passed);
//! ```
//!
//! [`ScanReport`]: nexus_contracts::ethics::ScanReport

pub mod engine;
pub mod message;
pub mod rule;

pub use engine::EthicsValidator;
pub use message::MessageBuilder;
pub use rule::{EthicsCheck, EthicsConfig, MessagePolicy};

// ── Tests ─────────────────────────────────────────────────────────────────────
