use std::path::PathBuf;

pub const BACKEND_URL_VAR: &str = "BACKEND_URL";
pub const ACTIVITY_ID_VAR: &str = "ACTIVITY_ID";

/// Agent CLI used when no override is configured.
pub const DEFAULT_AGENT_COMMAND: &str = "claude";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    #[error("backend URL must start with http:// or https://: {0}")]
    InvalidBackendUrl(String),
    #[error("cannot resolve current directory: {0}")]
    CurrentDir(#[from] std::io::Error),
}

/// Startup configuration for one relay invocation.
///
/// Built exactly once in `main` and passed down; nothing below the binary
/// reads the process environment for these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Backend base URL without trailing slash.
    pub backend_url: String,
    pub activity_id: String,
    pub agent_command: String,
    pub cwd: PathBuf,
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

impl RelayConfig {
    /// Validate raw values (typically from `BACKEND_URL` / `ACTIVITY_ID`).
    pub fn from_parts(
        backend_url: Option<String>,
        activity_id: Option<String>,
    ) -> Result<Self, ConfigError> {
        let backend_url = required(backend_url, BACKEND_URL_VAR)?;
        let activity_id = required(activity_id, ACTIVITY_ID_VAR)?;
        let cwd = std::env::current_dir()?;

        let config = Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            activity_id,
            agent_command: DEFAULT_AGENT_COMMAND.to_string(),
            cwd,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_agent_command(mut self, command: impl Into<String>) -> Self {
        let command = command.into();
        let command = command.trim();
        if !command.is_empty() {
            self.agent_command = command.to_string();
        }
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Validate config values. Called automatically by `from_parts`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend_url.to_ascii_lowercase();
        let ok = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"))
            .is_some_and(|host| !host.is_empty());
        if !ok {
            return Err(ConfigError::InvalidBackendUrl(self.backend_url.clone()));
        }
        if self.activity_id.is_empty() {
            return Err(ConfigError::MissingVar(ACTIVITY_ID_VAR));
        }
        Ok(())
    }
}
