//! Data Transfer Objects for the CI engine's HTTP API
//!
//! Request bodies and the `{success, message, data}` envelope the engine
//! wraps around application responses.

pub mod envelope;
pub mod trigger;
