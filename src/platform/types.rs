use serde::{Deserialize, Serialize};

/// A workflow registered in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    pub path: String,
    #[serde(default = "unknown_state")]
    pub state: String,
}

impl Workflow {
    /// Human-readable label used in results and summaries.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.path)
    }
}

fn unknown_state() -> String {
    "unknown".to_string()
}

/// The fields of a workflow run the dispatcher cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
}

/// Reply to a single API call.
///
/// Structured API errors (the service answered with a non-success status)
/// are kept apart from transport failures (no usable answer at all).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply<T> {
    Success(T),
    Api { status: u16, message: String },
    Transport(String),
}

impl<T> ApiReply<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiReply<U> {
        match self {
            ApiReply::Success(value) => ApiReply::Success(f(value)),
            ApiReply::Api { status, message } => ApiReply::Api { status, message },
            ApiReply::Transport(message) => ApiReply::Transport(message),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            ApiReply::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Short description of a failed reply, `None` on success.
    pub fn failure_note(&self) -> Option<String> {
        match self {
            ApiReply::Success(_) => None,
            ApiReply::Api { status, message } => Some(format!("HTTP {status}: {message}")),
            ApiReply::Transport(message) => Some(format!("transport error: {message}")),
        }
    }
}
