//! Core module containing fundamental types
//!
//! This module provides the basic building blocks for the write agent:
//! the option model and error handling.

pub mod errors;
pub mod options;

// Re-export for convenience
pub use errors::{ValidationErrors, WriterError, WriterResult};
pub use options::{AgentOptions, InterpolatedOptions};
