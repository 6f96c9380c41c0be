pub mod relay;

pub use relay::{ConfigError, RelayConfig, DEFAULT_AGENT_COMMAND};
