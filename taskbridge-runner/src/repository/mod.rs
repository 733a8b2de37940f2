//! Repository layer
//!
//! Repositories are thin clients for the two remote systems the runner talks
//! to: the ECS API and the Azure DevOps callback endpoint. They carry no
//! business logic.
//!
//! All repositories are trait-based to enable testing and mocking.

mod callbacks;
mod tasks;

// Re-export traits
pub use callbacks::CallbackRepository;
pub use tasks::TaskRepository;

// Re-export implementations
pub use callbacks::HttpCallbackRepository;
pub use tasks::EcsTaskRepository;
