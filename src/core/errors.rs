//! Error types for the InfluxDB write agent
//! Provides structured error handling using thiserror for better error reporting

use thiserror::Error;

/// Ordered list of option validation failures
///
/// Every violated rule contributes one message; validation never stops at the
/// first failure so an operator sees the whole picture at once.
#[derive(Error, Debug, Clone, PartialEq, Eq, Default)]
#[error("{}", .messages.join("; "))]
pub struct ValidationErrors {
    messages: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: Into<String>>(&mut self, message: S) {
        self.messages.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Main error type for the write agent
#[derive(Error, Debug)]
pub enum WriterError {
    /// Configuration loading errors (missing file, malformed values)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Options failed validation
    #[error("Invalid options: {0}")]
    Validation(#[from] ValidationErrors),

    /// The write URL could not be built from the interpolated options
    #[error("Invalid write endpoint '{endpoint}': {message}")]
    Endpoint { endpoint: String, message: String },

    /// HTTP transport errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sink error ({sink}): {message}")]
    Sink { message: String, sink: String },

    /// JSON decoding errors for options files and events
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for compatibility
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for convenience
pub type WriterResult<T> = std::result::Result<T, WriterError>;

impl WriterError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an endpoint error
    pub fn endpoint<E: Into<String>, S: Into<String>>(endpoint: E, message: S) -> Self {
        Self::Endpoint {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a sink error
    pub fn sink<S: Into<String>>(sink: &str, message: S) -> Self {
        Self::Sink {
            message: message.into(),
            sink: sink.to_string(),
        }
    }
}
