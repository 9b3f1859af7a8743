//! Domain types shared by the client, the engine and the CLI

pub mod cluster;
pub mod execution;
pub mod history;
pub mod job;
pub mod result;
