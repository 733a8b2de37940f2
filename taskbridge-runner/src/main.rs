//! Taskbridge Runner
//!
//! A Lambda function that turns Azure DevOps check requests, delivered
//! through SQS, into ECS Fargate tasks and reports back when each task is up.
//!
//! Architecture:
//! - Configuration: Loaded once from the environment at cold start
//! - Repositories: ECS API and Azure DevOps callback endpoint
//! - Services: Task launching and per-message orchestration
//! - Scheduler: Task status polling
//!
//! Each invocation processes its SQS batch in order. A message is decoded,
//! its task launched with an idempotency token derived from the job access
//! token, polled until RUNNING or STOPPED, and the outcome posted back to the
//! pipeline as a `TaskCompleted` event.

mod config;
mod error;
mod lambda;
mod repository;
mod scheduler;
mod service;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_lambda_events::sqs::SqsEvent;
use lambda_runtime::{LambdaEvent, service_fn};
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repository::{EcsTaskRepository, HttpCallbackRepository, TaskRepository};
use crate::scheduler::StatusPoller;
use crate::service::{EventOrchestrator, TaskLauncher};
use taskbridge_client::CallbackClient;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskbridge_runner=info,taskbridge_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting taskbridge runner");

    // Load configuration; a missing variable ends the process here
    let config = load_config().inspect_err(|e| error!("{:#}", e))?;
    info!(
        "Loaded configuration: cluster={}, task_definition={}, subnets={}, security_groups={}, ado={}",
        config.task.cluster,
        config.task.task_definition,
        config.task.subnets.len(),
        config.task.security_groups.len(),
        config.callback.target().base_url()
    );

    let orchestrator = Arc::new(build_orchestrator(&config).await?);
    info!(
        "Runner initialized, poll interval: {:?}",
        config.poll_interval
    );

    let shutdown = CancellationToken::new();
    spawn_shutdown_listener(shutdown.clone());

    let deadline_margin = config.deadline_margin;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<SqsEvent>| {
        let orchestrator = Arc::clone(&orchestrator);
        let shutdown = shutdown.clone();
        async move { lambda::handle_event(&orchestrator, &shutdown, deadline_margin, event).await }
    }))
    .await
}

/// Loads and validates configuration from environment variables
fn load_config() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

/// Builds the AWS and HTTP clients and wires the services together
async fn build_orchestrator(config: &Config) -> Result<EventOrchestrator> {
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let tasks: Arc<dyn TaskRepository> =
        Arc::new(EcsTaskRepository::new(aws_sdk_ecs::Client::new(&sdk_config)));

    let http_client = reqwest::Client::builder()
        .timeout(config.callback_timeout)
        .build()
        .context("Failed to build HTTP client")?;
    let callbacks = Arc::new(HttpCallbackRepository::new(CallbackClient::with_client(
        config.callback.target(),
        http_client,
    )));

    Ok(EventOrchestrator::new(
        TaskLauncher::new(config.task.clone(), Arc::clone(&tasks)),
        StatusPoller::new(tasks, config.poll_interval),
        callbacks,
    ))
}

/// Cancels `shutdown` when the runtime sends SIGTERM
fn spawn_shutdown_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                warn!("Received SIGTERM, cancelling in-flight work");
                shutdown.cancel();
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {}", e),
        }
    });
}
