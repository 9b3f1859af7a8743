//! Scheduler layer
//!
//! Background polling of the CI engine for test results. Each watched
//! build gets its own task and cancellation state.

pub mod poller;

pub use poller::{PollUpdate, ResultPoller, WatchHandle};
