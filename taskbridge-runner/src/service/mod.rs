//! Service layer
//!
//! Services contain business logic for the runner. They drive the
//! repositories through one trigger: launch a task, wait for it, report
//! the outcome.

mod launcher;
mod orchestrator;

pub use launcher::TaskLauncher;
pub use orchestrator::{EventOrchestrator, QueueMessage};
