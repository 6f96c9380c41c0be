use std::error::Error as _;
use std::path::PathBuf;

use ar_agent::{AgentRuntime, QueryOptions, RuntimeError};
use ar_backend::{BackendClient, BackendError};
use ar_config::RelayConfig;
use futures::StreamExt;
use serde_json::{Map, Value};

use crate::prompt::build_prompt;
use crate::translator::{Relay, DEFAULT_COMPLETION};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to fetch agent context: {0}")]
    Context(#[from] BackendError),
    #[error("agent context has no current prompt")]
    MissingPrompt,
    #[error("agent execution failed: {0}")]
    Execution(#[from] RuntimeError),
}

impl RunError {
    pub fn name(&self) -> &'static str {
        match self {
            RunError::Context(_) | RunError::MissingPrompt => "ContextFetchError",
            RunError::Execution(_) => "ExecutionError",
        }
    }

    /// Error callback metadata: message, cause chain and error name.
    pub fn metadata(&self) -> Map<String, Value> {
        let mut chain = vec![self.to_string()];
        let mut source = self.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {cause}"));
            source = cause.source();
        }

        let mut metadata = Map::new();
        metadata.insert("error".to_string(), Value::String(self.to_string()));
        metadata.insert("stack".to_string(), Value::String(chain.join("\n")));
        metadata.insert("name".to_string(), Value::String(self.name().to_string()));
        metadata
    }
}

/// Which execution path completed the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Resumed,
    FullPrompt,
}

/// Drives one agent invocation for one activity.
pub struct RunController<R> {
    relay: Relay,
    runtime: R,
    cwd: PathBuf,
}

impl<R: AgentRuntime> RunController<R> {
    pub fn new(config: &RelayConfig, runtime: R) -> Self {
        Self::with_client(BackendClient::from_config(config), runtime, config.cwd.clone())
    }

    pub fn with_client(client: BackendClient, runtime: R, cwd: PathBuf) -> Self {
        Self {
            relay: Relay::new(client),
            runtime,
            cwd,
        }
    }

    /// Run to completion. Fatal errors are reported to the backend (unless a
    /// terminal event already went out) and returned.
    pub async fn run(mut self) -> Result<RunOutcome, RunError> {
        match self.execute().await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracing::error!(
                    activity_id = %self.relay.client().activity_id(),
                    name = err.name(),
                    "Agent run failed: {}",
                    err
                );
                if self.relay.terminal_reported() {
                    tracing::warn!("Terminal event already reported; not sending run error");
                } else {
                    self.relay.fail(&err.to_string(), Some(err.metadata())).await;
                }
                Err(err)
            }
        }
    }

    async fn execute(&mut self) -> Result<RunOutcome, RunError> {
        let context = self.relay.client().fetch_context().await?;
        if context.current_prompt.trim().is_empty() {
            return Err(RunError::MissingPrompt);
        }

        if let Some(session_id) = context.resumable_session() {
            tracing::info!(session_id, "Resuming agent session");
            let options = QueryOptions::new(self.cwd.clone()).with_resume(session_id);
            self.relay.hold_terminal();
            match self.drive(context.current_prompt.clone(), options).await {
                Ok(()) => {
                    self.relay.release_held().await;
                    self.ensure_terminal().await;
                    return Ok(RunOutcome::Resumed);
                }
                Err(err) => {
                    let dropped_result = self.relay.discard_held();
                    tracing::warn!(
                        session_id,
                        kind = err.kind(),
                        dropped_result,
                        "Resume failed, falling back to full prompt: {}",
                        err
                    );
                }
            }
        }

        tracing::info!(
            history = context.messages.len(),
            "Running agent with full prompt"
        );
        let prompt = build_prompt(&context);
        self.drive(prompt, QueryOptions::new(self.cwd.clone()))
            .await?;
        self.ensure_terminal().await;
        Ok(RunOutcome::FullPrompt)
    }

    async fn drive(&mut self, prompt: String, options: QueryOptions) -> Result<(), RuntimeError> {
        let mut events = self.runtime.query(prompt, options);
        while let Some(event) = events.next().await {
            self.relay.forward(&event?).await;
        }
        Ok(())
    }

    async fn ensure_terminal(&mut self) {
        if !self.relay.terminal_reported() {
            tracing::debug!("Agent finished without a result event");
            self.relay.complete(DEFAULT_COMPLETION).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
