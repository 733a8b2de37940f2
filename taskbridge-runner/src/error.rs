//! Error types for the runner
//!
//! `BackendError` covers the compute backend; `HandlerError` is what one
//! invocation reports to the Lambda runtime, tagged with the step that failed.

use std::fmt;

use taskbridge_client::ClientError;
use thiserror::Error;

/// Errors returned by the compute backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request was rejected before reaching the backend
    #[error("Invalid launch request: {0}")]
    InvalidRequest(String),

    /// RunTask call failed
    #[error("RunTask failed: {0}")]
    RunTask(String),

    /// RunTask succeeded but returned no task
    #[error("No task was launched: {0}")]
    NoTaskLaunched(String),

    /// DescribeTasks call failed
    #[error("DescribeTasks failed: {0}")]
    DescribeTasks(String),

    /// DescribeTasks returned no task for the identifier
    #[error("Failed to describe task {0}")]
    TaskNotFound(String),
}

/// Step of message processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decode,
    Launch,
    Poll,
    Callback,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Decode => "decoding the message",
            Stage::Launch => "launching the task",
            Stage::Poll => "polling the task status",
            Stage::Callback => "sending the callback",
        };
        f.write_str(name)
    }
}

/// Errors that abort an invocation
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Message body is not a valid inbound request
    #[error("Failed to parse message body of {message_id}: {source}")]
    Decode {
        message_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Task launch was rejected or failed
    #[error("Failed to run task: {0}")]
    Launch(#[source] BackendError),

    /// Task status query failed
    #[error("Failed to get task status: {0}")]
    Status(#[source] BackendError),

    /// Callback could not be delivered or was rejected
    #[error("Failed to send ADO callback: {0}")]
    Callback(#[source] ClientError),

    /// Invocation deadline or shutdown interrupted processing
    #[error("Invocation cancelled while {0}")]
    Cancelled(Stage),
}

impl HandlerError {
    /// The step that failed
    pub fn stage(&self) -> Stage {
        match self {
            HandlerError::Decode { .. } => Stage::Decode,
            HandlerError::Launch(_) => Stage::Launch,
            HandlerError::Status(_) => Stage::Poll,
            HandlerError::Callback(_) => Stage::Callback,
            HandlerError::Cancelled(stage) => *stage,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, HandlerError::Cancelled(_))
    }
}
