//! Duplex stream subsystem.
//!
//! # State Machines
//! ```text
//! Half duplex:  Reading ──first write──▶ Writing ──finish──▶ Finished
//!                  └───────────────finish (drain)──────────────▲
//! Full duplex:  Active ──finish (drain)──▶ Finished
//! ```
//!
//! # Design Decisions
//! - Closed set of two variants, picked once per request from config
//! - Each stream owns its codec exclusively for one request
//! - Finishing twice is an error; nothing is written the second time

mod full_duplex;
mod half_duplex;

use bytes::{Bytes, BytesMut};
use tracing::Span;

use crate::codec::StreamCodec;
use crate::error::Result;

pub use full_duplex::FullDuplexStream;
pub use half_duplex::{HalfDuplexStream, Mode};

/// Duplex discipline, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplexMode {
    #[default]
    Half,
    Full,
}

impl DuplexMode {
    pub fn from_full_duplex(full_duplex: bool) -> Self {
        if full_duplex {
            DuplexMode::Full
        } else {
            DuplexMode::Half
        }
    }
}

/// Bidirectional stream handed to stream handlers.
pub enum DuplexStream {
    Half(HalfDuplexStream),
    Full(FullDuplexStream),
}

impl DuplexStream {
    /// Wrap a codec in the stream variant selected by `mode`.
    pub fn new(codec: Box<dyn StreamCodec>, mode: DuplexMode, span: Span) -> Self {
        match mode {
            DuplexMode::Half => DuplexStream::Half(HalfDuplexStream::new(codec, span)),
            DuplexMode::Full => DuplexStream::Full(FullDuplexStream::new(codec, span)),
        }
    }

    pub fn mode(&self) -> DuplexMode {
        match self {
            DuplexStream::Half(_) => DuplexMode::Half,
            DuplexStream::Full(_) => DuplexMode::Full,
        }
    }

    /// Read the next chunk of input, `None` at end of input.
    pub async fn read(&mut self) -> Result<Option<Bytes>> {
        match self {
            DuplexStream::Half(s) => s.read().await,
            DuplexStream::Full(s) => s.read().await,
        }
    }

    /// Read all remaining input into one buffer.
    pub async fn read_to_end(&mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.read().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }

    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        match self {
            DuplexStream::Half(s) => s.write(data).await,
            DuplexStream::Full(s) => s.write(data).await,
        }
    }

    /// Finish with the fixed success status.
    pub async fn finish_success(&mut self) -> Result<()> {
        match self {
            DuplexStream::Half(s) => s.finish_success().await,
            DuplexStream::Full(s) => s.finish_success().await,
        }
    }

    /// Finish with the given error code and message, written unmodified.
    pub async fn finish_error(&mut self, code: i32, message: &str) -> Result<()> {
        match self {
            DuplexStream::Half(s) => s.finish_error(code, message).await,
            DuplexStream::Full(s) => s.finish_error(code, message).await,
        }
    }

    pub fn is_finished(&self) -> bool {
        match self {
            DuplexStream::Half(s) => s.is_finished(),
            DuplexStream::Full(s) => s.is_finished(),
        }
    }
}
