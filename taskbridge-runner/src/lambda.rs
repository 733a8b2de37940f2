//! Lambda entry glue
//!
//! Adapts SQS batches to the orchestrator and bounds each invocation by the
//! deadline the Lambda runtime hands us.

use aws_lambda_events::sqs::SqsEvent;
use lambda_runtime::LambdaEvent;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::HandlerError;
use crate::service::{EventOrchestrator, QueueMessage};

/// Handles one SQS-triggered invocation
///
/// # Arguments
/// * `orchestrator` - Shared orchestrator built at cold start
/// * `shutdown` - Process-wide token cancelled on SIGTERM
/// * `deadline_margin` - How early to cancel before the invocation deadline
/// * `event` - The SQS batch and invocation context
pub async fn handle_event(
    orchestrator: &EventOrchestrator,
    shutdown: &CancellationToken,
    deadline_margin: Duration,
    event: LambdaEvent<SqsEvent>,
) -> Result<(), lambda_runtime::Error> {
    let context = event.context;
    let messages = queue_messages(event.payload);
    let budget = time_until_deadline(
        context.deadline,
        chrono::Utc::now().timestamp_millis(),
        deadline_margin,
    );

    info!(
        "Invocation {} received {} message(s), time budget {:?}",
        context.request_id,
        messages.len(),
        budget
    );

    let processed = run_with_deadline(orchestrator, &messages, shutdown, budget)
        .await
        .inspect_err(|e| {
            if e.is_cancelled() {
                warn!(
                    "Invocation {} cancelled, any launched task keeps running",
                    context.request_id
                );
            }
        })?;

    info!(
        "Invocation {} processed {} message(s)",
        context.request_id, processed
    );
    Ok(())
}

/// Runs a batch, cancelling it once `budget` has elapsed or `shutdown` fires
pub async fn run_with_deadline(
    orchestrator: &EventOrchestrator,
    messages: &[QueueMessage],
    shutdown: &CancellationToken,
    budget: Duration,
) -> Result<usize, HandlerError> {
    let cancel = shutdown.child_token();

    let watchdog = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(budget).await;
            warn!("Invocation deadline reached, cancelling in-flight work");
            cancel.cancel();
        })
    };

    let result = orchestrator.process_batch(messages, &cancel).await;
    watchdog.abort();

    result
}

/// Converts SQS records to queue messages, keeping their order
///
/// A record without a body becomes an empty message, which fails decoding.
pub fn queue_messages(event: SqsEvent) -> Vec<QueueMessage> {
    event
        .records
        .into_iter()
        .map(|record| QueueMessage {
            id: record.message_id.unwrap_or_default(),
            body: record.body.unwrap_or_default(),
        })
        .collect()
}

/// Time left before `deadline_ms` (epoch millis) minus `margin`
///
/// Saturates at zero when the deadline has passed or is closer than `margin`.
pub fn time_until_deadline(deadline_ms: u64, now_ms: i64, margin: Duration) -> Duration {
    let now_ms = u64::try_from(now_ms).unwrap_or_default();
    Duration::from_millis(deadline_ms.saturating_sub(now_ms)).saturating_sub(margin)
}
