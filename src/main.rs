// Command-line driver for the headless session engine
//
// Runs one create or resume session and prints either the blocking response or
// one wire message per line.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use kodegen_headless_cli::{
    CliProgram, EngineOptions, HeadlessEngine, SessionMode, SessionStatus, SubscriptionKey,
    ToolKind,
};
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "kodegen-headless-cli", version, about = "Run claude or codex headlessly")]
struct Cli {
    /// Default tool when --cli is not given
    #[arg(long, global = true, env = "HEADLESS_CLI", default_value = "claude")]
    default_cli: ToolKind,

    /// Session timeout in seconds
    #[arg(long, global = true, env = "HEADLESS_SESSION_TIMEOUT_SECS", default_value_t = 600)]
    timeout_secs: u64,

    /// Path to the claude executable
    #[arg(long, global = true, env = "HEADLESS_CLAUDE_PATH")]
    claude_path: Option<PathBuf>,

    /// Path to the codex executable
    #[arg(long, global = true, env = "HEADLESS_CODEX_PATH")]
    codex_path: Option<PathBuf>,

    /// Print one JSON wire message per line instead of a final response
    #[arg(long, global = true)]
    stream: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start a new session
    Create(SessionArgs),
    /// Resume a session by id
    Resume {
        /// Session id (UUID)
        session_id: String,
        #[command(flatten)]
        args: SessionArgs,
    },
}

#[derive(Debug, Args)]
struct SessionArgs {
    /// Prompt text
    prompt: String,

    /// Tool to run
    #[arg(long)]
    cli: Option<ToolKind>,

    /// Working directory
    #[arg(long, short = 'C')]
    working_dir: Option<PathBuf>,

    /// Model override
    #[arg(long)]
    model: Option<String>,
}

impl Cli {
    fn engine_options(&self) -> EngineOptions {
        let mut builder = EngineOptions::builder()
            .default_tool(self.default_cli)
            .session_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(ref path) = self.claude_path {
            builder = builder.program(ToolKind::Claude, CliProgram::new(path));
        }
        if let Some(ref path) = self.codex_path {
            builder = builder.program(ToolKind::Codex, CliProgram::new(path));
        }
        builder.build()
    }
}

fn payload(args: &SessionArgs, session_id: Option<&str>) -> Result<serde_json::Value> {
    let working_dir = match args.working_dir {
        Some(ref dir) => Some(dir.to_str().ok_or_else(|| {
            anyhow!("Working directory is not valid UTF-8: {}", dir.display())
        })?),
        None => None,
    };

    Ok(json!({
        "sessionId": session_id,
        "prompt": args.prompt,
        "workingDir": working_dir,
        "cli": args.cli,
        "model": args.model,
    }))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();
    let engine = HeadlessEngine::new(cli.engine_options());

    let (operation, payload) = match &cli.command {
        Command::Create(args) => (SessionMode::Create, payload(args, None)?),
        Command::Resume { session_id, args } => {
            (SessionMode::Resume, payload(args, Some(session_id))?)
        }
    };

    if cli.stream {
        let mut messages = Box::pin(engine.stream_payload(
            SubscriptionKey::new(cli.default_cli, operation),
            payload,
        ));
        let mut success = false;
        while let Some(message) = messages.next().await {
            success = message.event.ends_with(":complete");
            println!(
                "{}",
                serde_json::to_string(&message).context("Failed to encode wire message")?
            );
        }
        return Ok(exit_code(success));
    }

    match engine.run_payload(operation, &payload).await {
        Ok(response) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&response).context("Failed to encode response")?
            );
            Ok(exit_code(response.status == SessionStatus::Completed))
        }
        Err(error) => {
            eprintln!(
                "{}",
                serde_json::to_string(&error).context("Failed to encode error")?
            );
            Ok(exit_code(false))
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
