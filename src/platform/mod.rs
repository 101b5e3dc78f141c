pub mod github;
pub mod types;

use async_trait::async_trait;

use types::*;

/// The slice of the GitHub Actions API the dispatcher drives.
///
/// Every call answers with an [`ApiReply`] instead of an error so callers
/// decide which failures are fatal and which become a reportable status.
#[async_trait]
pub trait ActionsApi: Send + Sync {
    /// List the repository's workflows.
    async fn list_workflows(&self) -> ApiReply<Vec<Workflow>>;

    /// Fetch the most recent run of a workflow on a branch, if any.
    async fn latest_run(
        &self,
        workflow_id: u64,
        branch: &str,
    ) -> ApiReply<Option<WorkflowRun>>;

    /// Request a new run of a workflow. Succeeds only on `204 No Content`.
    async fn dispatch(&self, workflow_id: u64, git_ref: &str) -> ApiReply<()>;

    /// Fetch a single run.
    async fn get_run(&self, run_id: u64) -> ApiReply<WorkflowRun>;
}
