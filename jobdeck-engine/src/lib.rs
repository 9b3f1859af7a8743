//! Jobdeck Engine
//!
//! The job-execution orchestration layer of the Jobdeck CI client.
//!
//! Architecture:
//! - Configuration: engine URL, poll interval, request timeout
//! - Services: job catalog, execution tracker, trigger/restart, history
//! - Scheduler: per-execution cancellable result polling
//! - Session: the context object owning all of the above
//!
//! Presentation layers construct one [`Session`], call into it, and render
//! what it returns.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;
mod session;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, Result};
pub use scheduler::{PollUpdate, ResultPoller, WatchHandle};
pub use session::{Session, WatchEvent};
