use serde::Serialize;
use std::fmt;

/// Status recorded for a dispatched workflow.
///
/// Statuses the dispatcher assigns itself have their own variant; anything
/// else the API reports is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum RunStatus {
    NotDispatched,
    DispatchSent,
    TimedOut,
    Unknown,
    Completed,
    Other(String),
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::NotDispatched => "not_dispatched",
            RunStatus::DispatchSent => "dispatch_sent",
            RunStatus::TimedOut => "timed_out",
            RunStatus::Unknown => "unknown",
            RunStatus::Completed => "completed",
            RunStatus::Other(status) => status,
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of completion polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { conclusion: String },
    TimedOut { waited_secs: u64 },
    Unknown { reason: String },
}

/// Outcome of one dispatch attempt.
///
/// Built only through the outcome constructors so a conclusion never
/// appears without a completed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowResult {
    workflow: String,
    workflow_id: u64,
    run_id: Option<u64>,
    status: RunStatus,
    conclusion: Option<String>,
    note: String,
}

impl WorkflowResult {
    /// The dispatch request was refused or never reached the API.
    pub fn not_dispatched(workflow: String, workflow_id: u64, note: String) -> Self {
        Self {
            workflow,
            workflow_id,
            run_id: None,
            status: RunStatus::NotDispatched,
            conclusion: None,
            note,
        }
    }

    /// The dispatch was accepted but the new run never became visible.
    pub fn dispatch_sent(workflow: String, workflow_id: u64) -> Self {
        Self {
            workflow,
            workflow_id,
            run_id: None,
            status: RunStatus::DispatchSent,
            conclusion: None,
            note: "Run id not observed".to_string(),
        }
    }

    /// The run was found and polled to a terminal state.
    pub fn polled(workflow: String, workflow_id: u64, run_id: u64, outcome: RunOutcome) -> Self {
        let (status, conclusion, note) = match outcome {
            RunOutcome::Completed { conclusion } => {
                (RunStatus::Completed, Some(conclusion), String::new())
            }
            RunOutcome::TimedOut { waited_secs } => (
                RunStatus::TimedOut,
                None,
                format!("Run did not complete within {waited_secs}s"),
            ),
            RunOutcome::Unknown { reason } => (RunStatus::Unknown, None, reason),
        };

        Self {
            workflow,
            workflow_id,
            run_id: Some(run_id),
            status,
            conclusion,
            note,
        }
    }

    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    pub fn workflow_id(&self) -> u64 {
        self.workflow_id
    }

    pub fn run_id(&self) -> Option<u64> {
        self.run_id
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn conclusion(&self) -> Option<&str> {
        self.conclusion.as_deref()
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    /// Whether this result should make the process exit non-zero.
    ///
    /// `dispatch_sent` is not a failure: the run may still be going.
    pub fn is_failure(&self) -> bool {
        match &self.status {
            RunStatus::NotDispatched | RunStatus::TimedOut | RunStatus::Unknown => true,
            RunStatus::Completed => self.conclusion.as_deref() != Some("success"),
            RunStatus::DispatchSent | RunStatus::Other(_) => false,
        }
    }

    pub fn summary_line(&self) -> String {
        let mut line = format!("- {}: status={}", self.workflow, self.status);
        if let Some(run_id) = self.run_id {
            line.push_str(&format!(", run_id={run_id}"));
        }
        if let Some(conclusion) = &self.conclusion {
            line.push_str(&format!(", conclusion={conclusion}"));
        }
        if !self.note.is_empty() {
            line.push_str(&format!(", note={}", self.note));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(conclusion: &str) -> WorkflowResult {
        WorkflowResult::polled(
            "CI (ci.yml)".into(),
            1,
            10,
            RunOutcome::Completed {
                conclusion: conclusion.into(),
            },
        )
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(RunStatus::NotDispatched.as_str(), "not_dispatched");
        assert_eq!(RunStatus::DispatchSent.as_str(), "dispatch_sent");
        assert_eq!(RunStatus::TimedOut.as_str(), "timed_out");
        assert_eq!(RunStatus::Unknown.as_str(), "unknown");
        assert_eq!(RunStatus::Completed.to_string(), "completed");
        assert_eq!(RunStatus::Other("in_progress".into()).as_str(), "in_progress");
        assert_eq!(
            serde_json::to_value(RunStatus::Other("queued".into())).unwrap(),
            serde_json::json!("queued")
        );
    }

    #[test]
    fn test_conclusion_only_when_completed() {
        let ok = completed("success");
        assert_eq!(ok.status(), &RunStatus::Completed);
        assert_eq!(ok.conclusion(), Some("success"));

        let timed_out =
            WorkflowResult::polled("CI".into(), 1, 10, RunOutcome::TimedOut { waited_secs: 5 });
        assert_eq!(timed_out.status(), &RunStatus::TimedOut);
        assert!(timed_out.conclusion().is_none());
        assert_eq!(timed_out.note(), "Run did not complete within 5s");

        let unknown = WorkflowResult::polled(
            "CI".into(),
            1,
            10,
            RunOutcome::Unknown {
                reason: "HTTP 502: Bad Gateway".into(),
            },
        );
        assert!(unknown.conclusion().is_none());
        assert_eq!(unknown.run_id(), Some(10));

        let refused = WorkflowResult::not_dispatched("CI".into(), 1, "HTTP 422: nope".into());
        assert!(refused.conclusion().is_none());
        assert!(refused.run_id().is_none());

        let sent = WorkflowResult::dispatch_sent("CI".into(), 1);
        assert!(sent.conclusion().is_none());
        assert!(sent.run_id().is_none());
    }

    #[test]
    fn test_failure_classification() {
        assert!(!completed("success").is_failure());
        assert!(completed("failure").is_failure());
        assert!(completed("cancelled").is_failure());
        assert!(WorkflowResult::not_dispatched("CI".into(), 1, String::new()).is_failure());
        assert!(
            WorkflowResult::polled("CI".into(), 1, 2, RunOutcome::TimedOut { waited_secs: 0 })
                .is_failure()
        );
        let unknown = RunOutcome::Unknown {
            reason: String::new(),
        };
        assert!(WorkflowResult::polled("CI".into(), 1, 2, unknown).is_failure());
        assert!(!WorkflowResult::dispatch_sent("CI".into(), 1).is_failure());
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(completed("success")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "workflow": "CI (ci.yml)",
                "workflow_id": 1,
                "run_id": 10,
                "status": "completed",
                "conclusion": "success",
                "note": ""
            })
        );

        let value = serde_json::to_value(WorkflowResult::dispatch_sent("CI".into(), 3)).unwrap();
        assert_eq!(value["status"], "dispatch_sent");
        assert!(value["run_id"].is_null());
        assert!(value["conclusion"].is_null());
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            completed("success").summary_line(),
            "- CI (ci.yml): status=completed, run_id=10, conclusion=success"
        );
        assert_eq!(
            WorkflowResult::not_dispatched("Lint (lint.yml)".into(), 2, "HTTP 422: nope".into())
                .summary_line(),
            "- Lint (lint.yml): status=not_dispatched, note=HTTP 422: nope"
        );
    }
}
