//! Tasks repository
//!
//! Handles communication with ECS for task operations:
//! - Launching a single Fargate task
//! - Reading a task's last known status

use async_trait::async_trait;
use aws_sdk_ecs::Client;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::operation::describe_tasks::DescribeTasksOutput;
use aws_sdk_ecs::operation::run_task::RunTaskOutput;
use aws_sdk_ecs::operation::run_task::builders::RunTaskFluentBuilder;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, Failure, LaunchType, NetworkConfiguration, PropagateTags,
};
use taskbridge_core::domain::task::{LaunchRequest, LaunchedTask, TaskStatus};
use tracing::debug;

use crate::error::BackendError;

/// Repository trait for task operations on the compute backend
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Launches one task
    ///
    /// Launches carrying the same idempotency token and parameters are
    /// deduplicated by the backend.
    ///
    /// # Arguments
    /// * `request` - The launch request
    async fn run_task(&self, request: &LaunchRequest) -> Result<LaunchedTask, BackendError>;

    /// Returns the last known status of a task
    ///
    /// # Arguments
    /// * `cluster` - The cluster the task runs on
    /// * `task_id` - The task ARN
    async fn describe_task_status(
        &self,
        cluster: &str,
        task_id: &str,
    ) -> Result<TaskStatus, BackendError>;
}

/// ECS implementation of TaskRepository
pub struct EcsTaskRepository {
    client: Client,
}

impl EcsTaskRepository {
    /// Creates a new ECS task repository
    ///
    /// # Arguments
    /// * `client` - ECS client built from the shared SDK config
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskRepository for EcsTaskRepository {
    async fn run_task(&self, request: &LaunchRequest) -> Result<LaunchedTask, BackendError> {
        let output = run_task_call(&self.client, request)?
            .send()
            .await
            .map_err(|e| BackendError::RunTask(DisplayErrorContext(&e).to_string()))?;

        debug!(
            "RunTask returned {} task(s) and {} failure(s)",
            output.tasks().len(),
            output.failures().len()
        );

        launched_task(&output, &request.cluster)
    }

    async fn describe_task_status(
        &self,
        cluster: &str,
        task_id: &str,
    ) -> Result<TaskStatus, BackendError> {
        let output = self
            .client
            .describe_tasks()
            .cluster(cluster)
            .tasks(task_id)
            .send()
            .await
            .map_err(|e| BackendError::DescribeTasks(DisplayErrorContext(&e).to_string()))?;

        task_status(&output, task_id)
    }
}

/// Builds the RunTask call: one public-IP Fargate task in the given
/// subnets, deduplicated by the request's idempotency token
fn run_task_call(
    client: &Client,
    request: &LaunchRequest,
) -> Result<RunTaskFluentBuilder, BackendError> {
    let vpc = AwsVpcConfiguration::builder()
        .set_subnets(Some(request.subnets.clone()))
        .set_security_groups(Some(request.security_groups.clone()))
        .assign_public_ip(AssignPublicIp::Enabled)
        .build()
        .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;

    let network = NetworkConfiguration::builder()
        .awsvpc_configuration(vpc)
        .build();

    Ok(client
        .run_task()
        .cluster(&request.cluster)
        .task_definition(&request.task_definition)
        .count(1)
        .launch_type(LaunchType::Fargate)
        .propagate_tags(PropagateTags::TaskDefinition)
        .enable_ecs_managed_tags(true)
        .enable_execute_command(true)
        .client_token(&request.idempotency_token)
        .network_configuration(network))
}

/// Takes the first launched task, or reports why none was started
fn launched_task(output: &RunTaskOutput, cluster: &str) -> Result<LaunchedTask, BackendError> {
    let task_id = output
        .tasks()
        .first()
        .and_then(|task| task.task_arn())
        .ok_or_else(|| BackendError::NoTaskLaunched(describe_failures(output.failures())))?;

    Ok(LaunchedTask {
        task_id: task_id.to_string(),
        cluster: cluster.to_string(),
    })
}

/// Reads the last status of the described task; a missing status is `""`
fn task_status(output: &DescribeTasksOutput, task_id: &str) -> Result<TaskStatus, BackendError> {
    let task = output
        .tasks()
        .first()
        .ok_or_else(|| BackendError::TaskNotFound(task_id.to_string()))?;

    Ok(TaskStatus::from(task.last_status().unwrap_or_default()))
}

/// Formats RunTask failures as `arn: reason` pairs
fn describe_failures(failures: &[Failure]) -> String {
    if failures.is_empty() {
        return "backend reported no failures".to_string();
    }

    failures
        .iter()
        .map(|f| {
            format!(
                "{}: {}",
                f.arn().unwrap_or("unknown"),
                f.reason().unwrap_or("unknown reason")
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}
