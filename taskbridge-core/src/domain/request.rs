//! Inbound trigger request

use serde::{Deserialize, Serialize};

/// A check request sent by an Azure DevOps "Invoke REST API" service
/// connection, delivered to the runner as a queue message body.
///
/// Field names on the wire are PascalCase and must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InboundRequest {
    /// The plan URL (`system.CollectionUri`)
    pub plan_url: String,
    /// The plan ID (`system.PlanId`)
    pub plan_id: String,
    /// The project ID (`system.TeamProjectId`)
    pub project_id: String,
    /// The hub name (`system.HostType`)
    pub hub_name: String,
    /// The job ID (`system.JobId`)
    pub job_id: String,
    /// The timeline ID (`system.TimelineId`)
    pub timeline_id: String,
    /// The task instance ID (`system.TaskInstanceId`)
    pub task_instance_id: String,
    /// The job access token (`system.AccessToken`)
    ///
    /// Seeds the launch idempotency token and authenticates the callback.
    pub auth_token: String,
}

impl InboundRequest {
    /// Decodes a request from a raw message body
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }
}
