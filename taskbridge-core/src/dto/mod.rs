//! Data Transfer Objects for the upstream callback API
//!
//! DTOs are the exact wire shapes the runner sends; they are built from
//! domain types and never persisted.

pub mod callback;
