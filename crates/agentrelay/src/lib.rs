//! Relays one coding-agent turn between the agent CLI and the activity backend.

pub mod controller;
pub mod prompt;
pub mod translator;

pub use controller::{RunController, RunError, RunOutcome};
pub use translator::{translate, Relay, Translation};

/// Default `RUST_LOG` filter for the binary.
pub const DEFAULT_LOG_FILTER: &str = "agentrelay=info,ar_backend=info,ar_agent=info";
