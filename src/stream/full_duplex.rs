//! Full duplex stream: reads and writes may interleave freely.
//!
//! This only lifts the read-before-write ordering of the half duplex stream.
//! The request and response are still carried by a single HTTP/1.1 exchange,
//! which is why the mode is experimental.

use bytes::Bytes;
use tracing::Span;

use crate::codec::{StreamCodec, StreamStatus};
use crate::error::{Result, StreamError};

/// Stream that routes reads and writes straight to the codec until finished.
pub struct FullDuplexStream {
    codec: Box<dyn StreamCodec>,
    finished: bool,
    span: Span,
}

impl FullDuplexStream {
    pub fn new(codec: Box<dyn StreamCodec>, span: Span) -> Self {
        Self {
            codec,
            finished: false,
            span,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub async fn read(&mut self) -> Result<Option<Bytes>> {
        self.ensure_active()?;
        self.codec.read().await
    }

    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_active()?;
        self.codec.write(data).await
    }

    pub async fn finish_success(&mut self) -> Result<()> {
        tracing::info!(parent: &self.span, "sending stream status: success");
        self.finish(StreamStatus::ok()).await
    }

    pub async fn finish_error(&mut self, code: i32, message: &str) -> Result<()> {
        tracing::warn!(
            parent: &self.span,
            code,
            status_message = message,
            "sending stream status: error"
        );
        self.finish(StreamStatus::new(code, message)).await
    }

    /// Drain whatever input is left, then write the status.
    ///
    /// The request body must be consumed in full before the connection can be
    /// reused, however much the handler already read.
    async fn finish(&mut self, status: StreamStatus) -> Result<()> {
        self.ensure_active()?;
        self.finished = true;

        let discarded = self.codec.drain_remaining().await?;
        tracing::debug!(parent: &self.span, discarded, "remaining input drained");

        self.codec.write_status(&status).await
    }

    fn ensure_active(&self) -> Result<()> {
        if self.finished {
            return Err(StreamError::AlreadyFinished);
        }
        Ok(())
    }
}
