//! Correlation ID and tracing context management
//!
//! Every receive cycle gets a correlation ID; each event handled within the
//! cycle runs in a child span carrying the same ID.

use tracing::Span;
use uuid::Uuid;

/// A correlation ID that uniquely identifies a receive cycle
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a UUID-based correlation ID
    pub fn new_uuid() -> Self {
        CorrelationId(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tracing context that holds correlation and span information
#[derive(Debug, Clone)]
pub struct TracingContext {
    pub correlation_id: CorrelationId,
    pub span: Span,
}

impl TracingContext {
    /// Create a context for one receive cycle
    pub fn receive_cycle(event_count: usize) -> Self {
        Self::with_correlation_id(CorrelationId::new_uuid(), event_count)
    }

    /// Create a receive cycle context with a specific correlation ID
    pub fn with_correlation_id(correlation_id: CorrelationId, event_count: usize) -> Self {
        let span = tracing::info_span!(
            "receive_cycle",
            correlation_id = %correlation_id,
            events = event_count,
            component = "write_influxdb"
        );

        Self {
            correlation_id,
            span,
        }
    }

    /// Create a child context for one event of the cycle
    pub fn event_context(&self, index: usize) -> Self {
        let span = tracing::info_span!(
            parent: &self.span,
            "write_event",
            correlation_id = %self.correlation_id,
            event = index,
            component = "write_influxdb"
        );

        Self {
            correlation_id: self.correlation_id.clone(),
            span,
        }
    }
}
