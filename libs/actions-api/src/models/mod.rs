//! API models

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Workflow dispatch request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Git ref the workflow runs against
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Workflow inputs, all string-valued
    pub inputs: BTreeMap<String, String>,
}

/// Workflow run listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRunsResponse {
    #[serde(default)]
    pub total_count: Option<u64>,

    pub workflow_runs: Vec<WorkflowRun>,
}

/// A single workflow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub status: RunStatus,
    pub conclusion: Option<RunConclusion>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl WorkflowRun {
    /// Conclusion, only when the run has completed
    pub fn final_conclusion(&self) -> Option<&RunConclusion> {
        match self.status {
            RunStatus::Completed => self.conclusion.as_ref(),
            _ => None,
        }
    }
}

/// Run lifecycle status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    /// Any status this client does not classify (waiting, requested, pending)
    Other(String),
}

impl From<String> for RunStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "completed" => RunStatus::Completed,
            _ => RunStatus::Other(raw),
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Queued => f.write_str("queued"),
            RunStatus::InProgress => f.write_str("in_progress"),
            RunStatus::Completed => f.write_str("completed"),
            RunStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// Run conclusion, set once the run is completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunConclusion {
    Success,
    Failure,
    Cancelled,
    /// timed_out, skipped, action_required, neutral, stale...
    Other(String),
}

impl From<String> for RunConclusion {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "success" => RunConclusion::Success,
            "failure" => RunConclusion::Failure,
            "cancelled" => RunConclusion::Cancelled,
            _ => RunConclusion::Other(raw),
        }
    }
}

impl From<RunConclusion> for String {
    fn from(conclusion: RunConclusion) -> Self {
        conclusion.to_string()
    }
}

impl fmt::Display for RunConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunConclusion::Success => f.write_str("success"),
            RunConclusion::Failure => f.write_str("failure"),
            RunConclusion::Cancelled => f.write_str("cancelled"),
            RunConclusion::Other(raw) => f.write_str(raw),
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub documentation_url: Option<String>,
}
