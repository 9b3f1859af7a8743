//! Jobdeck Core
//!
//! Core types for the Jobdeck CI client.
//!
//! This crate contains:
//! - Domain types: jobs, clusters, executions, test results and history
//! - DTOs: request and response envelopes exchanged with the CI engine

pub mod domain;
pub mod dto;
mod serde_ext;
