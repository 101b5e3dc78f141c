use tokio::time::{sleep, Instant};

use crate::platform::types::{ApiReply, Workflow};
use crate::platform::ActionsApi;
use crate::workflow::policy::PollPolicy;
use crate::workflow::types::{RunOutcome, WorkflowResult};

/// Drives one workflow through dispatch, run discovery and completion polling.
pub struct DispatchSequencer<'a> {
    api: &'a dyn ActionsApi,
    policy: PollPolicy,
}

impl<'a> DispatchSequencer<'a> {
    pub fn new(api: &'a dyn ActionsApi, policy: PollPolicy) -> Self {
        Self { api, policy }
    }

    /// Id of the most recent run of `workflow_id` on `branch`.
    ///
    /// A failed lookup reads as "no runs yet". The baseline comparison in
    /// [`Self::await_new_run`] relies on both cases meaning the same thing.
    pub async fn latest_run_id(&self, workflow_id: u64, branch: &str) -> Option<u64> {
        match self.api.latest_run(workflow_id, branch).await {
            ApiReply::Success(run) => run.map(|r| r.id),
            failure => {
                let note = failure.failure_note().unwrap_or_default();
                tracing::debug!(
                    workflow_id,
                    branch,
                    error = %note,
                    "Latest run lookup failed, treating as no runs"
                );
                None
            }
        }
    }

    /// Request a new run. The error carries a note for the result.
    pub async fn dispatch(&self, workflow_id: u64, git_ref: &str) -> Result<(), String> {
        let reply = self.api.dispatch(workflow_id, git_ref).await;
        match reply.failure_note() {
            None => Ok(()),
            Some(note) => Err(note),
        }
    }

    /// Poll for a run id different from `baseline`.
    pub async fn await_new_run(
        &self,
        workflow_id: u64,
        git_ref: &str,
        baseline: Option<u64>,
    ) -> Option<u64> {
        for attempt in 1..=self.policy.discovery_attempts {
            if let Some(run_id) = self.latest_run_id(workflow_id, git_ref).await {
                if Some(run_id) != baseline {
                    tracing::debug!(workflow_id, run_id, attempt, "Observed new run");
                    return Some(run_id);
                }
            }

            if attempt < self.policy.discovery_attempts {
                sleep(self.policy.discovery_interval).await;
            }
        }

        None
    }

    /// Poll a run until it completes, the deadline passes, or a poll fails.
    ///
    /// A timeout too large to represent as an instant means no deadline.
    pub async fn await_completion(&self, run_id: u64) -> RunOutcome {
        let deadline = Instant::now().checked_add(self.policy.timeout);

        while deadline.map_or(true, |deadline| Instant::now() < deadline) {
            let run = match self.api.get_run(run_id).await {
                ApiReply::Success(run) => run,
                failure => {
                    return RunOutcome::Unknown {
                        reason: format!(
                            "Run status request failed: {}",
                            failure.failure_note().unwrap_or_default()
                        ),
                    };
                }
            };

            match run.status.as_deref() {
                Some("completed") => {
                    return RunOutcome::Completed {
                        // null conclusion on a completed run is recorded as "unknown"
                        conclusion: run.conclusion.unwrap_or_else(|| "unknown".to_string()),
                    };
                }
                status => {
                    tracing::debug!(
                        run_id,
                        status = status.unwrap_or("unknown"),
                        "Run still in progress"
                    );
                }
            }

            sleep(self.policy.poll_interval).await;
        }

        RunOutcome::TimedOut {
            waited_secs: self.policy.timeout.as_secs(),
        }
    }

    /// Dispatch `workflow` on `git_ref` and wait for the outcome.
    pub async fn execute(&self, workflow: &Workflow, git_ref: &str) -> WorkflowResult {
        let label = workflow.label();
        let baseline = self.latest_run_id(workflow.id, git_ref).await;

        tracing::info!(
            workflow = %label,
            workflow_id = workflow.id,
            git_ref,
            baseline = ?baseline,
            "Dispatching workflow"
        );

        if let Err(note) = self.dispatch(workflow.id, git_ref).await {
            tracing::warn!(workflow_id = workflow.id, note = %note, "Dispatch rejected");
            return WorkflowResult::not_dispatched(label, workflow.id, note);
        }

        let Some(run_id) = self.await_new_run(workflow.id, git_ref, baseline).await else {
            tracing::warn!(
                workflow_id = workflow.id,
                attempts = self.policy.discovery_attempts,
                "Dispatch accepted but no new run appeared"
            );
            return WorkflowResult::dispatch_sent(label, workflow.id);
        };

        tracing::info!(workflow_id = workflow.id, run_id, "Waiting for run to complete");

        let outcome = self.await_completion(run_id).await;
        let result = WorkflowResult::polled(label, workflow.id, run_id, outcome);

        tracing::info!(
            workflow_id = workflow.id,
            run_id,
            status = %result.status(),
            conclusion = result.conclusion().unwrap_or("-"),
            "Workflow finished"
        );

        result
    }
}
