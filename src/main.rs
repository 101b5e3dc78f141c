use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use actions_dispatcher::commands::{handle_command, Commands, ExitStatus};
use actions_dispatcher::config::{AppConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "actions-dispatcher",
    about = "Dispatch GitHub Actions workflows and wait for their runs"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref());
    init_tracing(
        config
            .as_ref()
            .map(|c| c.logging.format)
            .unwrap_or_default(),
    );

    let result = run(cli.command, config).await;
    if let Err(e) = &result {
        eprintln!("{e:#}");
    }

    ExitCode::from(ExitStatus::or_fatal(result).code())
}

async fn run(
    command: Commands,
    config: actions_dispatcher::error::Result<AppConfig>,
) -> anyhow::Result<ExitStatus> {
    let mut config = config.context("Failed to load configuration")?;
    config.apply(command.overrides());

    tracing::debug!(config = ?config, "Loaded configuration");

    let status = handle_command(command, &config).await?;
    Ok(status)
}

// Logs go to stderr; stdout carries the JSON output.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}
