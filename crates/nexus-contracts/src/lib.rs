//! # nexus-contracts
//!
//! Shared types, payloads, and error contracts for the NEXUS agent network.
//!
//! All crates in the workspace import from here. No orchestration logic lives
//! in this crate, only data definitions and error types.

pub mod agent;
pub mod error;
pub mod ethics;
pub mod event;
pub mod message;
pub mod workflow;
