use serde::Deserialize;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::workflow::policy::PollPolicy;

/// Environment variable the access token is read from when the config has none.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Clone)]
pub struct GitHubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// Manual Debug impl to avoid leaking the access token
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            owner: default_owner(),
            repo: default_repo(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    #[serde(default = "default_ref", rename = "ref")]
    pub git_ref: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_discovery_attempts")]
    pub discovery_attempts: u32,
    #[serde(default = "default_discovery_interval")]
    pub discovery_interval_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            git_ref: default_ref(),
            timeout_secs: default_timeout(),
            interval_secs: default_interval(),
            discovery_attempts: default_discovery_attempts(),
            discovery_interval_secs: default_discovery_interval(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Values given on the command line. Each one, when set, wins over the
/// loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub git_ref: Option<String>,
    pub timeout_secs: Option<u64>,
    pub interval_secs: Option<u64>,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_owner() -> String {
    "pytorch-fdn".to_string()
}

fn default_repo() -> String {
    "accelerator-integration-wg".to_string()
}

fn default_user_agent() -> String {
    concat!("actions-dispatcher/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_ref() -> String {
    "main".to_string()
}

fn default_timeout() -> u64 {
    1800
}

fn default_interval() -> u64 {
    10
}

fn default_discovery_attempts() -> u32 {
    30
}

fn default_discovery_interval() -> u64 {
    2
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder
                .add_source(config::File::with_name("actions-dispatcher").required(false));
        }

        // Environment variable overrides with DISPATCHER_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("DISPATCHER")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.resolve_token(std::env::var(TOKEN_ENV).ok());
        Ok(config)
    }

    /// Fill in the token from the environment if the sources did not set one.
    pub fn resolve_token(&mut self, env_token: Option<String>) {
        let has_token = self.github.token.as_deref().is_some_and(|t| !t.is_empty());
        if !has_token {
            self.github.token = env_token.filter(|t| !t.is_empty());
        }
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(owner) = overrides.owner {
            self.github.owner = owner;
        }
        if let Some(repo) = overrides.repo {
            self.github.repo = repo;
        }
        if let Some(git_ref) = overrides.git_ref {
            self.dispatch.git_ref = git_ref;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.dispatch.timeout_secs = timeout;
        }
        if let Some(interval) = overrides.interval_secs {
            self.dispatch.interval_secs = interval;
        }
    }

    pub fn token(&self) -> Result<&str> {
        self.github
            .token
            .as_deref()
            .ok_or_else(|| AppError::Config(format!("{TOKEN_ENV} is required")))
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            discovery_attempts: self.dispatch.discovery_attempts,
            discovery_interval: Duration::from_secs(self.dispatch.discovery_interval_secs),
            timeout: Duration::from_secs(self.dispatch.timeout_secs),
            poll_interval: Duration::from_secs(self.dispatch.interval_secs),
        }
    }
}
