//! The InfluxDB write agent
//!
//! For every received event the options are rendered against the event's
//! fields, the write endpoint is computed, and each line protocol statement is
//! posted on its own. A failed line is recorded in the agent log and the loop
//! moves on; nothing is retried.

use chrono::{DateTime, Utc};
use reqwest::Url;
use std::sync::Arc;
use tracing::{Instrument, debug, info};

use crate::agent_log::AgentLog;
use crate::core::{AgentOptions, ValidationErrors, WriterError, WriterResult};
use crate::event::Event;
use crate::sink::{HttpLineSink, LineSink, WriteMetrics};
use crate::tracing_context::TracingContext;
use crate::validation::validate_options;

pub const DESCRIPTION: &str = "\
Writes data from incoming events to an InfluxDB database.

Options:
  url      Connection URL to the database (e.g. http://influx:8086)
  db       Database name
  payload  Array of write commands in line protocol format. Instead of
           configuring lines here, events may carry their own `payload`
           (or `influx_payload`) array.
  expected_receive_period_in_days
           Days that may pass without an event before the agent is
           considered idle
  debug    \"true\" to log the endpoint, every line and every response status";

/// Counters for a single `receive` call
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveReport {
    /// Events handled, including those that produced no request
    pub events: usize,
    /// Events dropped because no endpoint could be built for them
    pub events_skipped: usize,
    pub lines_attempted: usize,
    pub lines_succeeded: usize,
    pub lines_failed: usize,
}

pub struct WriteInfluxdbAgent {
    options: AgentOptions,
    sink: Arc<dyn LineSink>,
    log: AgentLog,
    metrics: WriteMetrics,
    last_receive_at: Option<DateTime<Utc>>,
}

impl WriteInfluxdbAgent {
    /// Validate `options` and build an agent delivering through `sink`
    ///
    /// Invalid options block activation: every violated rule is returned.
    pub fn new(options: AgentOptions, sink: Arc<dyn LineSink>) -> Result<Self, ValidationErrors> {
        validate_options(&options)?;
        debug!(
            "Agent configured with {} sink, expected receive period {:?}",
            sink.sink_type(),
            options.expected_receive_period()
        );

        Ok(Self {
            options,
            sink,
            log: AgentLog::new(),
            metrics: WriteMetrics::default(),
            last_receive_at: None,
        })
    }

    /// Build an agent posting to the database over HTTP
    pub fn with_http_sink(options: AgentOptions) -> Result<Self, ValidationErrors> {
        Self::new(options, Arc::new(HttpLineSink::new()))
    }

    pub fn default_options() -> AgentOptions {
        AgentOptions::default()
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn log(&self) -> &AgentLog {
        &self.log
    }

    pub fn metrics(&self) -> &WriteMetrics {
        &self.metrics
    }

    pub fn last_receive_at(&self) -> Option<DateTime<Utc>> {
        self.last_receive_at
    }

    /// Health as the host sees it: events have arrived and no error was
    /// logged since the latest receive cycle started
    pub fn working(&self) -> bool {
        match (self.last_receive_at, self.log.last_error_at()) {
            (Some(_), None) => true,
            (Some(received), Some(errored)) => received > errored,
            (None, _) => false,
        }
    }

    /// Handle a batch of events, one at a time and in order
    pub async fn receive(&mut self, events: &[Event]) -> ReceiveReport {
        let mut report = ReceiveReport::default();
        if events.is_empty() {
            return report;
        }

        self.last_receive_at = Some(Utc::now());
        let context = TracingContext::receive_cycle(events.len());

        for (index, event) in events.iter().enumerate() {
            let span = context.event_context(index).span;
            self.write_to_db(event, &mut report).instrument(span).await;
            report.events += 1;
        }

        info!(
            parent: &context.span,
            "Processed {} events: {} lines sent, {} failed, {} events skipped",
            report.events,
            report.lines_succeeded,
            report.lines_failed,
            report.events_skipped
        );

        report
    }

    async fn write_to_db(&mut self, event: &Event, report: &mut ReceiveReport) {
        let interpolated = self.options.interpolate(&event.payload);

        let endpoint = match write_endpoint(&interpolated.url, &interpolated.db) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                self.log.error(format!("Skipping event: {}", e));
                report.events_skipped += 1;
                return;
            }
        };

        if interpolated.debug {
            self.log.info(endpoint.to_string());
        }

        let lines = if interpolated.payload.is_empty() {
            event.payload_lines()
        } else {
            interpolated.payload
        };

        if lines.is_empty() {
            debug!("No payload lines for event, nothing to write");
            return;
        }

        for line in &lines {
            if interpolated.debug {
                self.log.info(line.clone());
            }

            report.lines_attempted += 1;
            match self.sink.write_line(&endpoint, line).await {
                Ok(outcome) => {
                    if interpolated.debug {
                        self.log
                            .info(format!("response status code: {}", outcome.status));
                    }

                    if outcome.is_success() {
                        self.metrics.record_success(line.len());
                        report.lines_succeeded += 1;
                    } else {
                        self.metrics.record_failure();
                        report.lines_failed += 1;
                        self.log.error(format!(
                            "Write to {} rejected with status {}: {}",
                            endpoint, outcome.status, line
                        ));
                    }
                }
                Err(e) => {
                    self.metrics.record_failure();
                    report.lines_failed += 1;
                    self.log
                        .error(format!("Write to {} failed: {}", endpoint, e));
                }
            }
        }
    }
}

/// `{url}/write?db={db}`, keeping any path prefix and query already on `url`
pub fn write_endpoint(url: &str, db: &str) -> WriterResult<Url> {
    let mut endpoint = Url::parse(url).map_err(|e| WriterError::endpoint(url, e.to_string()))?;

    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(WriterError::endpoint(url, "url must be http(s)"));
    }

    let path = format!("{}/write", endpoint.path().trim_end_matches('/'));
    endpoint.set_path(&path);
    endpoint.query_pairs_mut().append_pair("db", db);

    Ok(endpoint)
}
