//! Event orchestrator
//!
//! Processes a batch of queue messages one at a time. For each message:
//! 1. Decode the inbound request
//! 2. Derive the idempotency token and launch the task
//! 3. Poll the task until RUNNING or STOPPED
//! 4. Report the outcome to Azure DevOps
//!
//! The first failure stops the batch; redelivery is left to the queue.

use std::sync::Arc;
use taskbridge_core::domain::request::InboundRequest;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::{HandlerError, Stage};
use crate::repository::CallbackRepository;
use crate::scheduler::StatusPoller;
use crate::service::TaskLauncher;

/// One message taken from the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Queue-assigned message ID, used in logs
    pub id: String,
    /// Raw JSON body
    pub body: String,
}

/// Drives launch, poll and callback for each message
pub struct EventOrchestrator {
    launcher: TaskLauncher,
    poller: StatusPoller,
    callbacks: Arc<dyn CallbackRepository>,
}

impl EventOrchestrator {
    pub fn new(
        launcher: TaskLauncher,
        poller: StatusPoller,
        callbacks: Arc<dyn CallbackRepository>,
    ) -> Self {
        Self {
            launcher,
            poller,
            callbacks,
        }
    }

    /// Processes messages in order, stopping at the first failure
    ///
    /// # Returns
    /// The number of messages processed
    pub async fn process_batch(
        &self,
        messages: &[QueueMessage],
        cancel: &CancellationToken,
    ) -> Result<usize, HandlerError> {
        for message in messages {
            if let Err(e) = self.process_message(message, cancel).await {
                error!(
                    "Failed to process message {} while {}: {}",
                    message.id,
                    e.stage(),
                    e
                );
                return Err(e);
            }
        }

        Ok(messages.len())
    }

    /// Processes a single message
    ///
    /// # Returns
    /// The raw callback response
    pub async fn process_message(
        &self,
        message: &QueueMessage,
        cancel: &CancellationToken,
    ) -> Result<String, HandlerError> {
        let request =
            InboundRequest::from_json(&message.body).map_err(|source| HandlerError::Decode {
                message_id: message.id.clone(),
                source,
            })?;

        info!(
            "Processing message {} for job {} (plan {}, project {})",
            message.id, request.job_id, request.plan_id, request.project_id
        );

        if cancel.is_cancelled() {
            return Err(HandlerError::Cancelled(Stage::Launch));
        }

        let launch = self.launcher.prepare(&request.auth_token);
        let task = cancel
            .run_until_cancelled(self.launcher.launch(&launch))
            .await
            .ok_or(HandlerError::Cancelled(Stage::Launch))?
            .map_err(HandlerError::Launch)?;

        let outcome = self.poller.poll_until_terminal(&task, cancel).await?;

        let response = cancel
            .run_until_cancelled(self.callbacks.report(&request, outcome))
            .await
            .ok_or(HandlerError::Cancelled(Stage::Callback))?
            .map_err(HandlerError::Callback)?;

        info!(
            "Reported {} for job {} task {}, response: {}",
            outcome, request.job_id, request.task_instance_id, response
        );

        Ok(response)
    }
}
