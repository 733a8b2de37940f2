//! Task status poller
//!
//! Queries a launched task at a fixed interval until it is RUNNING or
//! STOPPED. There is no attempt limit; the loop ends on a terminal status,
//! a query error, or cancellation.

use std::sync::Arc;
use taskbridge_core::domain::task::{LaunchedTask, TaskOutcome};
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{HandlerError, Stage};
use crate::repository::TaskRepository;

/// Polls a task until it reaches a terminal status
pub struct StatusPoller {
    tasks: Arc<dyn TaskRepository>,
    interval: Duration,
}

impl StatusPoller {
    /// Creates a new status poller
    ///
    /// # Arguments
    /// * `tasks` - Backend to query
    /// * `interval` - Fixed wait between two queries
    pub fn new(tasks: Arc<dyn TaskRepository>, interval: Duration) -> Self {
        Self { tasks, interval }
    }

    /// Blocks until `task` is RUNNING (succeeded) or STOPPED (failed)
    ///
    /// Cancellation is checked before each query, during the query and
    /// while sleeping.
    pub async fn poll_until_terminal(
        &self,
        task: &LaunchedTask,
        cancel: &CancellationToken,
    ) -> Result<TaskOutcome, HandlerError> {
        let mut attempt: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(HandlerError::Cancelled(Stage::Poll));
            }

            attempt += 1;

            let status = cancel
                .run_until_cancelled(self.tasks.describe_task_status(&task.cluster, &task.task_id))
                .await
                .ok_or(HandlerError::Cancelled(Stage::Poll))?
                .map_err(HandlerError::Status)?;

            if let Some(outcome) = status.outcome() {
                info!(
                    "Task {} reached {} after {} poll(s), outcome: {}",
                    task.task_id, status, attempt, outcome
                );
                return Ok(outcome);
            }

            debug!(
                "Task {} is {} (attempt {}), checking again in {:?}",
                task.task_id, status, attempt, self.interval
            );

            tokio::select! {
                _ = cancel.cancelled() => return Err(HandlerError::Cancelled(Stage::Poll)),
                _ = time::sleep(self.interval) => {}
            }
        }
    }
}
