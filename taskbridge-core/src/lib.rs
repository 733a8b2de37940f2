//! Taskbridge Core
//!
//! Core types shared by the taskbridge client and runner.
//!
//! This crate contains:
//! - Domain types: inbound trigger requests, launch requests, task status
//! - DTOs: payloads sent to the upstream callback API
//! - Token generation for idempotent task launches

pub mod domain;
pub mod dto;
pub mod token;

pub use token::generate_idempotency_token;
