//! Compute task domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of an idempotency token accepted by the compute backend
pub const MAX_TOKEN_LEN: usize = 64;

/// Request to launch a single task on the compute backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Cluster name or ARN
    pub cluster: String,
    /// Task definition as `family:revision` or full ARN
    pub task_definition: String,
    /// Client token used by the backend to deduplicate retried launches
    pub idempotency_token: String,
    /// Subnet IDs, in configured order
    pub subnets: Vec<String>,
    /// Security group IDs, in configured order
    pub security_groups: Vec<String>,
}

impl LaunchRequest {
    /// Returns true if the idempotency token is non-empty ASCII of at most
    /// [`MAX_TOKEN_LEN`] characters
    pub fn has_valid_token(&self) -> bool {
        !self.idempotency_token.is_empty()
            && self.idempotency_token.len() <= MAX_TOKEN_LEN
            && self.idempotency_token.is_ascii()
    }
}

/// Handle to a task accepted by the compute backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchedTask {
    /// Opaque task identifier (ARN)
    pub task_id: String,
    /// Cluster the task was launched on
    pub cluster: String,
}

/// Last known status of a task as reported by the backend
///
/// Only `RUNNING` and `STOPPED` are terminal for the runner; every other
/// value (`PROVISIONING`, `PENDING`, `ACTIVATING`, ...) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Stopped,
    Other(String),
}

impl TaskStatus {
    /// Maps a terminal status to the outcome reported upstream
    ///
    /// Returns `None` for non-terminal statuses.
    pub fn outcome(&self) -> Option<TaskOutcome> {
        match self {
            TaskStatus::Running => Some(TaskOutcome::Succeeded),
            TaskStatus::Stopped => Some(TaskOutcome::Failed),
            TaskStatus::Other(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Running => "RUNNING",
            TaskStatus::Stopped => "STOPPED",
            TaskStatus::Other(s) => s,
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        match s {
            "RUNNING" => TaskStatus::Running,
            "STOPPED" => TaskStatus::Stopped,
            other => TaskStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        TaskStatus::from(s.as_str())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a launched task as reported in the callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOutcome {
    Succeeded,
    Failed,
}

impl TaskOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskOutcome::Succeeded => "succeeded",
            TaskOutcome::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
