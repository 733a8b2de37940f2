//! Scheduler layer for the runner
//!
//! This layer waits on launched tasks: it polls the compute backend until a
//! task reaches a terminal status or the invocation is cancelled.

pub mod poller;

pub use poller::StatusPoller;
