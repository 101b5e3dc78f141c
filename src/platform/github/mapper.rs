use serde::Deserialize;

use crate::platform::types::{Workflow, WorkflowRun};

/// Body of `GET /repos/{owner}/{repo}/actions/workflows`.
#[derive(Debug, Deserialize)]
pub struct WorkflowsPage {
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

/// Body of `GET /repos/{owner}/{repo}/actions/workflows/{id}/runs`.
#[derive(Debug, Deserialize)]
pub struct RunsPage {
    #[serde(default)]
    pub workflow_runs: Vec<WorkflowRun>,
}

impl RunsPage {
    pub fn into_latest(self) -> Option<WorkflowRun> {
        self.workflow_runs.into_iter().next()
    }
}

/// Pull the human-readable message out of an error body.
///
/// GitHub answers errors with `{"message": "...", "documentation_url": "..."}`;
/// anything else is passed through as-is.
pub fn error_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "empty response body".to_string();
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value["message"]
            .as_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}
