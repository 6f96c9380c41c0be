use std::path::PathBuf;

use futures::stream::BoxStream;

use crate::events::RuntimeEvent;

pub const DEFAULT_ALLOWED_TOOLS: [&str; 6] = ["Read", "Write", "Edit", "Glob", "Grep", "Bash"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionMode {
    BypassPermissions,
}

impl std::fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionMode::BypassPermissions => write!(f, "bypassPermissions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub allowed_tools: Vec<String>,
    pub permission_mode: PermissionMode,
    pub cwd: PathBuf,
    pub resume: Option<String>,
}

impl QueryOptions {
    /// Fixed execution profile: core file/shell tools, all permissions bypassed.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            allowed_tools: DEFAULT_ALLOWED_TOOLS.iter().map(|t| t.to_string()).collect(),
            permission_mode: PermissionMode::BypassPermissions,
            cwd: cwd.into(),
            resume: None,
        }
    }

    pub fn with_resume(mut self, session_id: impl Into<String>) -> Self {
        self.resume = Some(session_id.into());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("agent command not found: {0}")]
    NotInstalled(String),
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("agent I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("agent exited with {}: {stderr}", exit_label(.code))]
    Exited { code: Option<i32>, stderr: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "signal".to_string(),
    }
}

impl RuntimeError {
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::NotInstalled(_) => "NotInstalled",
            RuntimeError::Spawn { .. } => "Spawn",
            RuntimeError::Io(_) => "Io",
            RuntimeError::Exited { .. } => "Exited",
        }
    }
}

pub type EventStream = BoxStream<'static, Result<RuntimeEvent, RuntimeError>>;

/// An agent that runs one prompt and yields its output as a lazy stream.
pub trait AgentRuntime: Send + Sync {
    fn query(&self, prompt: String, options: QueryOptions) -> EventStream;
}
