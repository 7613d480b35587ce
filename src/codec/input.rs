//! Input side of a stream: decodes the framed request body.

use std::io;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

use super::decoder::FrameDecoder;
use super::frame::Frame;
use super::status::StreamStatus;
use crate::error::{Result, StreamError};

/// Raw request body chunks.
pub type BodyStream = BoxStream<'static, io::Result<Bytes>>;

/// Reads data payloads from a framed body until the peer's status frame.
///
/// A peer error status is surfaced once as [`StreamError::Remote`]; after
/// that the input behaves as exhausted.
pub struct StreamInput {
    body: BodyStream,
    decoder: FrameDecoder,
    remote_status: Option<StreamStatus>,
}

impl StreamInput {
    pub fn new(body: BodyStream, max_frame_size: u32) -> Self {
        Self {
            body,
            decoder: FrameDecoder::with_max_frame_size(max_frame_size),
            remote_status: None,
        }
    }

    /// Read the next data payload, or `None` once the peer finished.
    pub async fn read(&mut self) -> Result<Option<Bytes>> {
        if self.remote_status.is_some() {
            return Ok(None);
        }

        loop {
            match self.decoder.next_frame()? {
                Some(Frame::Data(payload)) => return Ok(Some(payload)),
                Some(Frame::Status(status)) => {
                    let ok = status.is_ok();
                    let (code, message) = (status.code, status.message.clone());
                    self.remote_status = Some(status);
                    if ok {
                        return Ok(None);
                    }
                    return Err(StreamError::Remote { code, message });
                }
                None => {}
            }

            match self.body.next().await {
                Some(chunk) => self.decoder.push(&chunk?)?,
                None => {
                    return Err(StreamError::Protocol(
                        "request body ended before the status frame".into(),
                    ));
                }
            }
        }
    }

    /// Read and discard everything up to and including the peer's status.
    ///
    /// Returns the number of payload bytes discarded.
    pub async fn drain_remaining(&mut self) -> Result<u64> {
        let mut discarded = 0u64;
        while let Some(payload) = self.read().await? {
            discarded += payload.len() as u64;
        }
        Ok(discarded)
    }

    /// The status the peer finished its side with, once seen.
    pub fn remote_status(&self) -> Option<&StreamStatus> {
        self.remote_status.as_ref()
    }
}
