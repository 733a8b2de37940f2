//! In-memory repositories for unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use taskbridge_client::ClientError;
use taskbridge_core::domain::request::InboundRequest;
use taskbridge_core::domain::task::{LaunchRequest, LaunchedTask, TaskOutcome, TaskStatus};

use crate::config::TaskConfig;
use crate::error::BackendError;
use crate::repository::{CallbackRepository, TaskRepository};

pub const TASK_ARN: &str = "arn:aws:ecs:eu-west-1:123456789012:task/agents/0123456789abcdef";

pub fn task_config() -> TaskConfig {
    TaskConfig {
        cluster: "agents".to_string(),
        task_definition: "ado-agent:3".to_string(),
        subnets: vec!["subnet-a".to_string(), "subnet-b".to_string()],
        security_groups: vec!["sg-a".to_string()],
    }
}

pub fn request_json(auth_token: &str) -> String {
    serde_json::json!({
        "PlanUrl": "https://dev.azure.com/myorg/",
        "PlanId": "PLAN1",
        "ProjectId": "P1",
        "HubName": "build",
        "JobId": "JOB1",
        "TimelineId": "TL1",
        "TaskInstanceId": "TASK1",
        "AuthToken": auth_token,
    })
    .to_string()
}

/// Task repository answering status queries from a script
///
/// Once the script is exhausted every query reports `PENDING`.
#[derive(Default)]
pub struct FakeTaskRepository {
    launch_error: Option<String>,
    statuses: Mutex<VecDeque<Result<&'static str, String>>>,
    launches: Mutex<Vec<LaunchRequest>>,
    queries: Mutex<Vec<(String, String)>>,
}

impl FakeTaskRepository {
    pub fn with_statuses(statuses: &[&'static str]) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().map(|s| Ok(*s)).collect()),
            ..Default::default()
        }
    }

    pub fn failing_launch(reason: &str) -> Self {
        Self {
            launch_error: Some(reason.to_string()),
            ..Default::default()
        }
    }

    /// Appends a failing status query to the script
    pub fn then_fail_query(self, reason: &str) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .push_back(Err(reason.to_string()));
        self
    }

    pub fn launches(&self) -> Vec<LaunchRequest> {
        self.launches.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskRepository for FakeTaskRepository {
    async fn run_task(&self, request: &LaunchRequest) -> Result<LaunchedTask, BackendError> {
        self.launches.lock().unwrap().push(request.clone());

        if let Some(reason) = &self.launch_error {
            return Err(BackendError::RunTask(reason.clone()));
        }

        Ok(LaunchedTask {
            task_id: TASK_ARN.to_string(),
            cluster: request.cluster.clone(),
        })
    }

    async fn describe_task_status(
        &self,
        cluster: &str,
        task_id: &str,
    ) -> Result<TaskStatus, BackendError> {
        self.queries
            .lock()
            .unwrap()
            .push((cluster.to_string(), task_id.to_string()));

        match self.statuses.lock().unwrap().pop_front() {
            Some(Ok(status)) => Ok(TaskStatus::from(status)),
            Some(Err(reason)) => Err(BackendError::DescribeTasks(reason)),
            None => Ok(TaskStatus::from("PENDING")),
        }
    }
}

/// Callback repository recording every report
#[derive(Default)]
pub struct FakeCallbackRepository {
    reject_with: Option<u16>,
    reports: Mutex<Vec<(InboundRequest, TaskOutcome)>>,
}

impl FakeCallbackRepository {
    pub fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            ..Default::default()
        }
    }

    pub fn reports(&self) -> Vec<(InboundRequest, TaskOutcome)> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl CallbackRepository for FakeCallbackRepository {
    async fn report(
        &self,
        request: &InboundRequest,
        outcome: TaskOutcome,
    ) -> taskbridge_client::Result<String> {
        self.reports.lock().unwrap().push((request.clone(), outcome));

        match self.reject_with {
            Some(status) => Err(ClientError::api_error(status, "rejected")),
            None => Ok(r#"{"accepted":true}"#.to_string()),
        }
    }
}
