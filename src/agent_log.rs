//! Per-agent log where debug output and runtime errors are recorded
//!
//! Entries are kept in memory, bounded, and mirrored into `tracing` so they
//! also reach whatever subscriber the process installed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tracing::{error, info};

/// Number of entries kept before the oldest are dropped
pub const DEFAULT_LOG_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentLogEntry {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct AgentLog {
    entries: VecDeque<AgentLogEntry>,
    capacity: usize,
    last_error_at: Option<DateTime<Utc>>,
}

impl AgentLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_LENGTH)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_LENGTH)),
            capacity: capacity.max(1),
            last_error_at: None,
        }
    }

    pub fn info<S: Into<String>>(&mut self, message: S) {
        let message = message.into();
        info!(agent_log = true, "{}", message);
        self.push(LogLevel::Info, message);
    }

    pub fn error<S: Into<String>>(&mut self, message: S) {
        let message = message.into();
        error!(agent_log = true, "{}", message);
        let at = self.push(LogLevel::Error, message);
        self.last_error_at = Some(at);
    }

    fn push(&mut self, level: LogLevel, message: String) -> DateTime<Utc> {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        let at = Utc::now();
        self.entries.push_back(AgentLogEntry { at, level, message });
        at
    }

    /// Time of the most recent error, survives truncation of old entries
    pub fn last_error_at(&self) -> Option<DateTime<Utc>> {
        self.last_error_at
    }

    pub fn entries(&self) -> impl Iterator<Item = &AgentLogEntry> {
        self.entries.iter()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn errors(&self) -> impl Iterator<Item = &AgentLogEntry> {
        self.entries.iter().filter(|e| e.level == LogLevel::Error)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_error_at = None;
    }
}

impl Default for AgentLog {
    fn default() -> Self {
        Self::new()
    }
}
