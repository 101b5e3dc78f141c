use serde::Serialize;
use std::io::Write;

use crate::error::Result;
use crate::platform::types::Workflow;
use crate::platform::ActionsApi;

use super::{fetch_workflows, ExitStatus};

/// One entry of the workflow matrix printed by `list`.
#[derive(Debug, Serialize)]
struct MatrixEntry<'a> {
    id: u64,
    name: &'a str,
    path: &'a str,
    state: &'a str,
}

impl<'a> From<&'a Workflow> for MatrixEntry<'a> {
    fn from(wf: &'a Workflow) -> Self {
        Self {
            id: wf.id,
            name: &wf.name,
            path: &wf.path,
            state: &wf.state,
        }
    }
}

/// Print every workflow of the repository as a single JSON array line.
pub async fn list<W: Write>(api: &dyn ActionsApi, out: &mut W) -> Result<ExitStatus> {
    let workflows = fetch_workflows(api).await?;
    tracing::info!(count = workflows.len(), "Listed workflows");

    let matrix: Vec<MatrixEntry<'_>> = workflows.iter().map(MatrixEntry::from).collect();
    writeln!(out, "{}", serde_json::to_string(&matrix)?)?;

    Ok(ExitStatus::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::ScriptedApi;
    use crate::platform::types::ApiReply;

    #[tokio::test]
    async fn test_list_prints_matrix() {
        let api = ScriptedApi::new().workflows(vec![ApiReply::Success(vec![
            Workflow {
                id: 1,
                name: "CI".into(),
                path: ".github/workflows/ci.yml".into(),
                state: "active".into(),
            },
            Workflow {
                id: 2,
                name: "Docs".into(),
                path: ".github/workflows/docs.yml".into(),
                state: "disabled_manually".into(),
            },
        ])]);

        let mut out = Vec::new();
        let status = list(&api, &mut out).await.unwrap();
        assert_eq!(status, ExitStatus::Success);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"id": 1, "name": "CI", "path": ".github/workflows/ci.yml", "state": "active"},
                {"id": 2, "name": "Docs", "path": ".github/workflows/docs.yml", "state": "disabled_manually"}
            ])
        );
    }

    #[tokio::test]
    async fn test_list_propagates_listing_failure() {
        let api = ScriptedApi::new().workflows(vec![ApiReply::Transport("dns error".into())]);

        let mut out = Vec::new();
        assert!(list(&api, &mut out).await.is_err());
        assert!(out.is_empty());
    }
}
