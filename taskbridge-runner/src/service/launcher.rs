//! Task launcher
//!
//! Turns a trigger's access token into an idempotent launch request and
//! submits it to the compute backend.

use std::sync::Arc;
use taskbridge_core::domain::task::{LaunchRequest, LaunchedTask, MAX_TOKEN_LEN};
use taskbridge_core::generate_idempotency_token;
use tracing::info;

use crate::config::TaskConfig;
use crate::error::BackendError;
use crate::repository::TaskRepository;

/// Launches one task per trigger with the configured placement
pub struct TaskLauncher {
    config: TaskConfig,
    tasks: Arc<dyn TaskRepository>,
}

impl TaskLauncher {
    pub fn new(config: TaskConfig, tasks: Arc<dyn TaskRepository>) -> Self {
        Self { config, tasks }
    }

    /// Builds the launch request for a trigger
    ///
    /// The idempotency token is derived from `seed` alone, so a redelivered
    /// message maps onto the task launched the first time.
    pub fn prepare(&self, seed: &str) -> LaunchRequest {
        LaunchRequest {
            cluster: self.config.cluster.clone(),
            task_definition: self.config.task_definition.clone(),
            idempotency_token: generate_idempotency_token(seed),
            subnets: self.config.subnets.clone(),
            security_groups: self.config.security_groups.clone(),
        }
    }

    /// Submits a launch request
    ///
    /// Backend errors are returned as-is; nothing is retried here.
    pub async fn launch(&self, request: &LaunchRequest) -> Result<LaunchedTask, BackendError> {
        if !request.has_valid_token() {
            return Err(BackendError::InvalidRequest(format!(
                "idempotency token must be 1 to {} ASCII characters",
                MAX_TOKEN_LEN
            )));
        }

        info!(
            "Running task {} on cluster {}",
            request.task_definition, request.cluster
        );

        let task = self.tasks.run_task(request).await?;

        info!("Task {} launched on cluster {}", task.task_id, task.cluster);
        Ok(task)
    }
}
