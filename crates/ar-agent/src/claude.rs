use std::collections::VecDeque;
use std::process::Stdio;

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Split};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::events::RuntimeEvent;
use crate::runners::{detect_version_from_command, is_command_available, resolve_command_path};
use crate::runtime::{AgentRuntime, EventStream, QueryOptions, RuntimeError};

const STDERR_TAIL_LINES: usize = 20;

/// Runs the Claude Code CLI in print mode and streams its JSON output.
#[derive(Debug, Clone)]
pub struct ClaudeCodeRunner {
    command: String,
}

impl Default for ClaudeCodeRunner {
    fn default() -> Self {
        Self::new("claude")
    }
}

impl ClaudeCodeRunner {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn name(&self) -> &str {
        "Claude Code"
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self, options: &QueryOptions) -> Vec<String> {
        let mut args: Vec<String> = [
            "-p",
            "--output-format",
            "stream-json",
            "--verbose",
            "--include-partial-messages",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if !options.allowed_tools.is_empty() {
            args.push("--allowedTools".to_string());
            args.push(options.allowed_tools.join(","));
        }
        args.push("--permission-mode".to_string());
        args.push(options.permission_mode.to_string());
        if let Some(session_id) = &options.resume {
            args.push("--resume".to_string());
            args.push(session_id.clone());
        }
        args
    }

    pub fn is_installed(&self) -> bool {
        is_command_available(&self.command)
    }

    pub fn detect_version(&self) -> Option<String> {
        detect_version_from_command(&self.command, &["--version"])
    }
}

impl AgentRuntime for ClaudeCodeRunner {
    fn query(&self, prompt: String, options: QueryOptions) -> EventStream {
        let command = self.command.clone();
        let args = self.args(&options);
        stream::once(async move { spawn_agent(&command, &args, &options, prompt).await })
            .map_ok(into_events)
            .try_flatten()
            .boxed()
    }
}

struct AgentProcess {
    child: Child,
    stdout: Split<BufReader<ChildStdout>>,
    stderr: JoinHandle<String>,
}

impl AgentProcess {
    async fn next_event(&mut self) -> Result<Option<RuntimeEvent>, RuntimeError> {
        while let Some(line) = self.stdout.next_segment().await? {
            if let Some(event) = RuntimeEvent::parse_line(&String::from_utf8_lossy(&line)) {
                return Ok(Some(event));
            }
        }
        self.finish().await?;
        Ok(None)
    }

    async fn finish(&mut self) -> Result<(), RuntimeError> {
        let status = self.child.wait().await?;
        let stderr = (&mut self.stderr).await.unwrap_or_default();
        if status.success() {
            tracing::debug!("Agent process exited cleanly");
            return Ok(());
        }
        Err(RuntimeError::Exited {
            code: status.code(),
            stderr,
        })
    }
}

fn into_events(process: AgentProcess) -> EventStream {
    stream::try_unfold(process, |mut process| async move {
        let next = process.next_event().await?;
        Ok(next.map(|event| (event, process)))
    })
    .boxed()
}

async fn spawn_agent(
    command: &str,
    args: &[String],
    options: &QueryOptions,
    prompt: String,
) -> Result<AgentProcess, RuntimeError> {
    let program = resolve_command_path(command)
        .ok_or_else(|| RuntimeError::NotInstalled(command.to_string()))?;

    tracing::info!(
        command = %program.display(),
        cwd = %options.cwd.display(),
        resume = options.resume.as_deref().unwrap_or("-"),
        "Starting agent"
    );

    let mut child = Command::new(&program)
        .args(args)
        .current_dir(&options.cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| RuntimeError::Spawn {
            command: command.to_string(),
            source,
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        tokio::spawn(async move {
            let written = match stdin.write_all(prompt.as_bytes()).await {
                Ok(()) => stdin.shutdown().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                tracing::debug!("Failed to write prompt to agent stdin: {}", e);
            }
        });
    }

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("agent stdout not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("agent stderr not captured"))?;

    Ok(AgentProcess {
        child,
        stdout: BufReader::new(stdout).split(b'\n'),
        stderr: tokio::spawn(collect_stderr_tail(stderr)),
    })
}

async fn collect_stderr_tail(stderr: ChildStderr) -> String {
    let mut lines = BufReader::new(stderr).split(b'\n');
    let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
    while let Ok(Some(bytes)) = lines.next_segment().await {
        let line = String::from_utf8_lossy(&bytes).trim_end().to_string();
        tracing::debug!(target: "ar_agent::stderr", "{}", line);
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    Vec::from(tail).join("\n")
}

/// Convenience for logging which agent binary a run will use.
pub fn describe(runner: &ClaudeCodeRunner) -> String {
    match (runner.is_installed(), runner.detect_version()) {
        (true, Some(version)) => format!("{} {} ({})", runner.name(), version, runner.command()),
        (true, None) => format!("{} ({})", runner.name(), runner.command()),
        (false, _) => format!("{} (not found: {})", runner.name(), runner.command()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
