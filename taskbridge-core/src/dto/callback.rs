//! Callback DTOs

use serde::{Deserialize, Serialize};

use crate::domain::request::InboundRequest;
use crate::domain::task::TaskOutcome;

/// Event name understood by the distributed task events API
pub const TASK_COMPLETED: &str = "TaskCompleted";

/// Body of a `TaskCompleted` event posted to the plan events endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletedEvent {
    pub name: String,
    pub job_id: String,
    pub task_id: String,
    pub result: TaskOutcome,
}

impl TaskCompletedEvent {
    /// Builds the completion event for a request and its task outcome
    pub fn new(request: &InboundRequest, result: TaskOutcome) -> Self {
        Self {
            name: TASK_COMPLETED.to_string(),
            job_id: request.job_id.clone(),
            task_id: request.task_instance_id.clone(),
            result,
        }
    }
}
