use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::platform::types::Workflow;
use crate::platform::ActionsApi;
use crate::workflow::{DispatchSequencer, PollPolicy, WorkflowResult};

use super::{fetch_workflows, ExitStatus};

fn exit_status(results: &[WorkflowResult]) -> ExitStatus {
    if results.iter().any(WorkflowResult::is_failure) {
        ExitStatus::WorkflowFailed
    } else {
        ExitStatus::Success
    }
}

/// Dispatch a single workflow, print its result as one JSON line and
/// optionally save it to `result_file`.
pub async fn run_one<W: Write>(
    api: &dyn ActionsApi,
    policy: PollPolicy,
    git_ref: &str,
    workflow: &Workflow,
    result_file: Option<&Path>,
    out: &mut W,
) -> Result<ExitStatus> {
    let result = DispatchSequencer::new(api, policy)
        .execute(workflow, git_ref)
        .await;

    writeln!(out, "{}", serde_json::to_string(&result)?)?;

    if let Some(path) = result_file.filter(|p| !p.as_os_str().is_empty()) {
        let mut payload = serde_json::to_string_pretty(&result)?;
        payload.push('\n');
        std::fs::write(path, payload)?;
        tracing::debug!(path = %path.display(), "Wrote result file");
    }

    Ok(exit_status(std::slice::from_ref(&result)))
}

/// Dispatch every workflow in listing order and print a summary.
///
/// A failing workflow never stops the batch; only the listing itself is fatal.
pub async fn run_all<W: Write>(
    api: &dyn ActionsApi,
    policy: PollPolicy,
    git_ref: &str,
    out: &mut W,
) -> Result<ExitStatus> {
    let workflows = fetch_workflows(api).await?;
    if workflows.is_empty() {
        writeln!(out, "No workflows found")?;
        return Ok(ExitStatus::WorkflowFailed);
    }

    let sequencer = DispatchSequencer::new(api, policy);
    let mut results = Vec::with_capacity(workflows.len());

    for (index, workflow) in workflows.iter().enumerate() {
        tracing::info!(
            workflow = %workflow.label(),
            position = index + 1,
            total = workflows.len(),
            "Running workflow"
        );
        results.push(sequencer.execute(workflow, git_ref).await);
    }

    writeln!(out, "\n=== Workflow execution summary ===")?;
    for result in &results {
        writeln!(out, "{}", result.summary_line())?;
    }

    Ok(exit_status(&results))
}
