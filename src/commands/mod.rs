//! Command surface: `list`, `run-one` and `run-all`.

mod list;
mod run;

pub use list::list;
pub use run::{run_all, run_one};

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::config::{AppConfig, Overrides};
use crate::error::{AppError, Result};
use crate::platform::github::GitHubActions;
use crate::platform::types::{ApiReply, Workflow};
use crate::platform::ActionsApi;

/// Top-level CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List workflows as a JSON matrix
    List(RepoArgs),
    /// Dispatch one workflow and wait for it
    RunOne(RunOneArgs),
    /// Dispatch every workflow, one after another, and wait for each
    RunAll(RunArgs),
}

#[derive(Debug, Args)]
pub struct RepoArgs {
    /// Repository owner [default: pytorch-fdn]
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name [default: accelerator-integration-wg]
    #[arg(long)]
    pub repo: Option<String>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Branch or tag to dispatch on [default: main]
    #[arg(long = "ref")]
    pub git_ref: Option<String>,

    /// Seconds to wait for each run to complete [default: 1800]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Seconds between two run status polls [default: 10]
    #[arg(long)]
    pub interval: Option<u64>,
}

#[derive(Debug, Args)]
pub struct RunOneArgs {
    #[command(flatten)]
    pub run: RunArgs,

    #[arg(long)]
    pub workflow_id: u64,

    #[arg(long)]
    pub workflow_name: String,

    #[arg(long)]
    pub workflow_path: String,

    /// Also write the result JSON to this file
    #[arg(long)]
    pub result_file: Option<PathBuf>,
}

impl RepoArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            ..Default::default()
        }
    }
}

impl RunArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            git_ref: self.git_ref.clone(),
            timeout_secs: self.timeout,
            interval_secs: self.interval,
            ..self.repo.overrides()
        }
    }
}

impl Commands {
    /// Command-line values that take precedence over the loaded config.
    pub fn overrides(&self) -> Overrides {
        match self {
            Commands::List(args) => args.overrides(),
            Commands::RunOne(args) => args.run.overrides(),
            Commands::RunAll(args) => args.overrides(),
        }
    }
}

/// How the process should exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    WorkflowFailed,
    Fatal,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::WorkflowFailed => 1,
            ExitStatus::Fatal => 2,
        }
    }

    /// Any error that escapes a command is fatal.
    pub fn or_fatal<E>(result: std::result::Result<ExitStatus, E>) -> ExitStatus {
        result.unwrap_or(ExitStatus::Fatal)
    }
}

/// Run a command against the repository named in `config`, writing
/// machine-readable output to stdout.
pub async fn handle_command(command: Commands, config: &AppConfig) -> Result<ExitStatus> {
    let token = config.token()?;
    let api = GitHubActions::new(&config.github, token)?;
    let policy = config.poll_policy();
    let git_ref = config.dispatch.git_ref.as_str();
    let mut out = std::io::stdout();

    tracing::debug!(
        owner = %config.github.owner,
        repo = %config.github.repo,
        "Using repository"
    );

    match command {
        Commands::List(_) => list(&api, &mut out).await,
        Commands::RunOne(args) => {
            let workflow = Workflow {
                id: args.workflow_id,
                name: args.workflow_name,
                path: args.workflow_path,
                state: "unknown".to_string(),
            };
            run_one(
                &api,
                policy,
                git_ref,
                &workflow,
                args.result_file.as_deref(),
                &mut out,
            )
            .await
        }
        Commands::RunAll(_) => run_all(&api, policy, git_ref, &mut out).await,
    }
}

/// List workflows, failing hard on any unsuccessful reply.
pub async fn fetch_workflows(api: &dyn ActionsApi) -> Result<Vec<Workflow>> {
    match api.list_workflows().await {
        ApiReply::Success(workflows) => Ok(workflows),
        failure => Err(AppError::GitHubApi(format!(
            "Failed to list workflows: {}",
            failure.failure_note().unwrap_or_default()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::ScriptedApi;
    use mockito::{Matcher, Server};

    fn run_all_command() -> Commands {
        Commands::RunAll(RunArgs {
            repo: RepoArgs {
                owner: None,
                repo: None,
            },
            git_ref: None,
            timeout: None,
            interval: None,
        })
    }

    #[tokio::test]
    async fn test_missing_token_is_fatal() {
        let config = AppConfig::default();

        let result = handle_command(run_all_command(), &config).await;
        assert!(matches!(result, Err(AppError::Config(_))));
        assert_eq!(ExitStatus::or_fatal(result).code(), 2);
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/widgets/actions/workflows")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"message": "Server Error"}"#)
            .create_async()
            .await;

        let mut config = AppConfig::default();
        config.github.api_url = server.url();
        config.github.owner = "acme".into();
        config.github.repo = "widgets".into();
        config.github.token = Some("test-token".into());

        let result = handle_command(run_all_command(), &config).await;
        assert!(matches!(result, Err(AppError::GitHubApi(_))));
        assert_eq!(ExitStatus::or_fatal(result), ExitStatus::Fatal);
        mock.assert_async().await;
    }

    #[test]
    fn test_or_fatal_keeps_command_status() {
        let ok: Result<ExitStatus> = Ok(ExitStatus::WorkflowFailed);
        assert_eq!(ExitStatus::or_fatal(ok), ExitStatus::WorkflowFailed);
    }

    #[tokio::test]
    async fn test_fetch_workflows_error_is_fatal() {
        let api = ScriptedApi::new().workflows(vec![ApiReply::Api {
            status: 401,
            message: "Bad credentials".into(),
        }]);

        let err = fetch_workflows(&api).await.unwrap_err();
        assert!(matches!(err, AppError::GitHubApi(_)));
        assert_eq!(
            err.to_string(),
            "GitHub API error: Failed to list workflows: HTTP 401: Bad credentials"
        );
    }

    #[test]
    fn test_run_args_overrides() {
        let args = RunArgs {
            repo: RepoArgs {
                owner: Some("acme".into()),
                repo: None,
            },
            git_ref: Some("dev".into()),
            timeout: Some(5),
            interval: None,
        };
        let overrides = Commands::RunAll(args).overrides();
        assert_eq!(overrides.owner.as_deref(), Some("acme"));
        assert!(overrides.repo.is_none());
        assert_eq!(overrides.git_ref.as_deref(), Some("dev"));
        assert_eq!(overrides.timeout_secs, Some(5));
        assert!(overrides.interval_secs.is_none());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::WorkflowFailed.code(), 1);
        assert_eq!(ExitStatus::Fatal.code(), 2);
    }
}
