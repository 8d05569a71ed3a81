//! # nexus-router
//!
//! Maps free-text task descriptions to the agents responsible for them.
//!
//! [`AgentRouter`] is a pure function over a [`RoutingTable`] loaded from
//! TOML: no I/O, no hidden state, and the same task always yields the same
//! ordered agent list.
//!
//! ```rust,ignore
//! use nexus_router::AgentRouter;
//!
//! let router = AgentRouter::builtin()?;
//! let agents = router.route("Find new leads and nurture them", None);
//! ```

pub mod router;
pub mod table;

pub use router::AgentRouter;
pub use table::{Refinement, RouteRule, RoutingTable};

// ── Tests ─────────────────────────────────────────────────────────────────────
