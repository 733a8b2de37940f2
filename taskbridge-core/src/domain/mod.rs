//! Core domain types
//!
//! These types describe one trigger as it moves through the runner:
//! the decoded inbound request, the launch request sent to the compute
//! backend, the launched task handle and the status it reports.

pub mod request;
pub mod task;
