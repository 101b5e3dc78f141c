use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::GitHubConfig;
use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::ActionsApi;

use super::mapper::{self, RunsPage, WorkflowsPage};

const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";

/// GitHub Actions REST client scoped to one repository.
pub struct GitHubActions {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
}

impl GitHubActions {
    pub fn new(config: &GitHubConfig, token: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
            AppError::Config(format!("Access token is not a valid header value: {e}"))
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
        })
    }

    fn actions_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/actions/{path}",
            self.api_url,
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.repo),
        )
    }

    /// Send a request and read the whole body. The error is a transport
    /// failure message: no usable answer came back.
    async fn send(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<(StatusCode, String), String> {
        let response = request.send().await.map_err(|e| e.to_string())?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read response body: {e}"))?;
        Ok((status, body))
    }

    /// Send a request that answers `200 OK` with a JSON body.
    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiReply<T> {
        let (status, body) = match self.send(request).await {
            Ok(raw) => raw,
            Err(message) => return ApiReply::Transport(message),
        };

        if status != StatusCode::OK {
            return ApiReply::Api {
                status: status.as_u16(),
                message: mapper::error_message(&body),
            };
        }

        match serde_json::from_str(&body) {
            Ok(value) => ApiReply::Success(value),
            Err(e) => ApiReply::Transport(format!("failed to parse response body: {e}")),
        }
    }
}

#[async_trait]
impl ActionsApi for GitHubActions {
    async fn list_workflows(&self) -> ApiReply<Vec<Workflow>> {
        let url = self.actions_url("workflows");
        tracing::debug!(url = %url, "Listing workflows");

        let request = self.client.get(&url).query(&[("per_page", "100")]);
        self.get_json::<WorkflowsPage>(request)
            .await
            .map(|page| page.workflows)
    }

    async fn latest_run(
        &self,
        workflow_id: u64,
        branch: &str,
    ) -> ApiReply<Option<WorkflowRun>> {
        let url = self.actions_url(&format!("workflows/{workflow_id}/runs"));
        tracing::debug!(workflow_id, branch, "Fetching latest run");

        let request = self
            .client
            .get(&url)
            .query(&[("branch", branch), ("per_page", "1")]);
        self.get_json::<RunsPage>(request)
            .await
            .map(RunsPage::into_latest)
    }

    async fn dispatch(&self, workflow_id: u64, git_ref: &str) -> ApiReply<()> {
        let url = self.actions_url(&format!("workflows/{workflow_id}/dispatches"));
        tracing::debug!(workflow_id, git_ref, "Dispatching workflow");

        let request = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "ref": git_ref }));

        match self.send(request).await {
            Ok((StatusCode::NO_CONTENT, _)) => ApiReply::Success(()),
            Ok((status, body)) => ApiReply::Api {
                status: status.as_u16(),
                message: mapper::error_message(&body),
            },
            Err(message) => ApiReply::Transport(message),
        }
    }

    async fn get_run(&self, run_id: u64) -> ApiReply<WorkflowRun> {
        let url = self.actions_url(&format!("runs/{run_id}"));
        tracing::debug!(run_id, "Fetching run status");

        self.get_json(self.client.get(&url)).await
    }
}
