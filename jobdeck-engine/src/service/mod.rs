//! Service layer
//!
//! Services hold the session's state and business rules. They reach the
//! CI engine only through the [`CiGateway`](jobdeck_client::CiGateway)
//! trait.

mod catalog;
mod history;
mod tracker;
mod trigger;

pub use catalog::{Catalog, ClusterChoice, ParameterField};
pub use history::HistoryService;
pub use tracker::ExecutionTracker;
pub use trigger::TriggerService;
