//! Half duplex stream: read first, process next, write last.

use bytes::Bytes;
use tracing::Span;

use crate::codec::{StreamCodec, StreamStatus};
use crate::error::{Result, StreamError};

/// Direction a half duplex stream is currently allowed to move data in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Reading,
    Writing,
}

/// Stream that drains the remaining request input on first write access.
///
/// The mode only ever moves from `Reading` to `Writing`, and
/// [`switch_to_writing`](Self::switch_to_writing) is the only place input is
/// drained, so all input is consumed before any output.
pub struct HalfDuplexStream {
    codec: Box<dyn StreamCodec>,
    mode: Mode,
    finished: bool,
    span: Span,
}

impl HalfDuplexStream {
    pub fn new(codec: Box<dyn StreamCodec>, span: Span) -> Self {
        Self {
            codec,
            mode: Mode::Reading,
            finished: false,
            span,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub async fn read(&mut self) -> Result<Option<Bytes>> {
        self.ensure_active()?;
        match self.mode {
            Mode::Reading => self.codec.read().await,
            Mode::Writing => Err(StreamError::ReadAfterWrite),
        }
    }

    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_active()?;
        self.switch_to_writing().await?;
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

    async fn finish(&mut self, status: StreamStatus) -> Result<()> {
        self.ensure_active()?;
        self.finished = true;
        self.switch_to_writing().await?;
        self.codec.write_status(&status).await
    }

    /// Move to writing mode, draining all unread input on the way.
    ///
    /// The mode only changes once the drain succeeded, so a failed drain is
    /// retried by the next write or finish.
    async fn switch_to_writing(&mut self) -> Result<()> {
        if self.mode == Mode::Writing {
            return Ok(());
        }

        tracing::info!(parent: &self.span, "switching to writing mode");
        let discarded = self.codec.drain_remaining().await?;
        tracing::debug!(parent: &self.span, discarded, "remaining input drained");
        self.mode = Mode::Writing;
        Ok(())
    }

    fn ensure_active(&self) -> Result<()> {
        if self.finished {
            return Err(StreamError::AlreadyFinished);
        }
        Ok(())
    }
}
