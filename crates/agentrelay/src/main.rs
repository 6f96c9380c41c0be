use agentrelay::{RunController, DEFAULT_LOG_FILTER};
use ar_agent::claude::describe;
use ar_agent::ClaudeCodeRunner;
use ar_config::{RelayConfig, DEFAULT_AGENT_COMMAND};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "agentrelay",
    version,
    about = "Run one coding-agent turn for a backend activity"
)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "BACKEND_URL")]
    backend_url: Option<String>,
    /// Activity to execute
    #[arg(long, env = "ACTIVITY_ID")]
    activity_id: Option<String>,
    /// Agent CLI to run
    #[arg(long, env = "AGENT_RELAY_CLAUDE_BIN", default_value = DEFAULT_AGENT_COMMAND)]
    agent_command: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = RelayConfig::from_parts(cli.backend_url, cli.activity_id)?
        .with_agent_command(cli.agent_command);

    let runner = ClaudeCodeRunner::new(config.agent_command.clone());
    tracing::info!(
        activity_id = %config.activity_id,
        agent = %describe(&runner),
        "Starting agent run"
    );

    let outcome = RunController::new(&config, runner).run().await?;
    tracing::info!(?outcome, "Agent run finished");
    Ok(())
}
