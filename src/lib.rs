//! InfluxDB write agent
//!
//! Receives events from a host pipeline and relays line protocol statements
//! to an InfluxDB `/write` endpoint, one HTTP POST per statement.

pub mod agent;
pub mod agent_log;
pub mod config;
pub mod core;
pub mod event;
pub mod sink;
pub mod template;
pub mod tracing_context;
pub mod validation;

#[cfg(test)]
mod test_server;

pub use agent::{ReceiveReport, WriteInfluxdbAgent};
pub use crate::core::{AgentOptions, ValidationErrors, WriterError, WriterResult};
pub use event::Event;
