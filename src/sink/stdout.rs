//! Standard output line sink for dry runs and debugging

use async_trait::async_trait;
use reqwest::Url;
use std::io::{self, Write};
use tracing::debug;

use super::{LineSink, WriteOutcome};
use crate::core::WriterResult;

/// Status reported for every line printed
const DRY_RUN_STATUS: u16 = 204;

/// Standard output line sink implementation
#[derive(Debug, Default, Clone)]
pub struct StdoutLineSink;

impl StdoutLineSink {
    /// Create a new stdout sink
    pub fn new() -> Self {
        Self
    }

    fn print(&self, endpoint: &Url, line: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "POST {}", endpoint)?;
        writeln!(stdout, "{}", line)?;
        stdout.flush()
    }
}

#[async_trait]
impl LineSink for StdoutLineSink {
    fn sink_type(&self) -> &'static str {
        "stdout"
    }

    async fn write_line(&self, endpoint: &Url, line: &str) -> WriterResult<WriteOutcome> {
        debug!("Printing line for {}", endpoint);
        self.print(endpoint, line)?;
        Ok(WriteOutcome::new(DRY_RUN_STATUS))
    }
}
