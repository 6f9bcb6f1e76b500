use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use super::{LineSink, WriteOutcome};
use crate::core::WriterResult;

/// HTTP line sink posting each statement to the database write endpoint
#[derive(Clone, Default)]
pub struct HttpLineSink {
    pub(crate) http_client: Client,
}

impl HttpLineSink {
    /// Create a new HTTP line sink
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
        }
    }
}

#[async_trait]
impl LineSink for HttpLineSink {
    fn sink_type(&self) -> &'static str {
        "http"
    }

    /// Post the line as the literal request body, once
    async fn write_line(&self, endpoint: &Url, line: &str) -> WriterResult<WriteOutcome> {
        let response = self
            .http_client
            .post(endpoint.clone())
            .body(line.to_owned())
            .send()
            .await?;

        let status = response.status();
        debug!("Write endpoint answered {}", status);

        Ok(WriteOutcome::new(status.as_u16()))
    }
}
