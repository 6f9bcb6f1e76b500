//! Line sinks: where rendered line protocol statements are delivered
//! Provides a pluggable seam between the agent and the HTTP transport

use crate::core::WriterResult;
use async_trait::async_trait;
use reqwest::Url;
use std::time::SystemTime;

pub mod http;
pub mod stdout;

pub use http::HttpLineSink;
pub use stdout::StdoutLineSink;

/// Result of delivering one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// HTTP status code returned by the endpoint
    pub status: u16,
}

impl WriteOutcome {
    pub fn new(status: u16) -> Self {
        Self { status }
    }

    /// 2xx statuses count as success
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for line sinks - implementations deliver one statement per call
#[async_trait]
pub trait LineSink: Send + Sync {
    /// Get the sink type identifier
    fn sink_type(&self) -> &'static str;

    /// Deliver a single line to the write endpoint
    ///
    /// A non-2xx response is not an error at this level; it is reported
    /// through the returned status. Errors mean the exchange itself failed.
    async fn write_line(&self, endpoint: &Url, line: &str) -> WriterResult<WriteOutcome>;
}

/// Cumulative delivery metrics for one agent
#[derive(Debug, Default, Clone)]
pub struct WriteMetrics {
    /// Lines accepted with a 2xx status
    pub lines_sent: u64,
    /// Lines rejected by the endpoint or lost to transport errors
    pub lines_failed: u64,
    /// Body bytes of accepted lines
    pub bytes_sent: u64,
    pub last_success_time: Option<SystemTime>,
    pub last_error_time: Option<SystemTime>,
}

impl WriteMetrics {
    /// Update metrics after a successful write
    pub fn record_success(&mut self, bytes_sent: usize) {
        self.lines_sent += 1;
        self.bytes_sent += bytes_sent as u64;
        self.last_success_time = Some(SystemTime::now());
    }

    /// Update metrics after a failed write
    pub fn record_failure(&mut self) {
        self.lines_failed += 1;
        self.last_error_time = Some(SystemTime::now());
    }
}
