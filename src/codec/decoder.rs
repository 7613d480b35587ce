//! Incremental frame decoder.
//!
//! Body chunks arrive with arbitrary boundaries, so the decoder accumulates
//! bytes in a `BytesMut` and walks a small state machine:
//! - `Header`: waiting for a tag and its fixed-size header
//! - `Data`: header parsed, waiting for the payload
//! - `Status`: header parsed, waiting for the status message
//! - `Finished`: status frame seen, no more input allowed

use bytes::{Buf, BytesMut};

use super::frame::{
    Frame, DATA_HEADER_SIZE, DEFAULT_MAX_FRAME_SIZE, STATUS_HEADER_SIZE, TAG_DATA, TAG_STATUS,
};
use super::status::StreamStatus;
use crate::error::{Result, StreamError};

#[derive(Debug, Clone, Copy)]
enum State {
    Header,
    Data { length: usize },
    Status { code: i32, length: usize },
    Finished,
}

/// Decoder turning raw body chunks into frames.
pub struct FrameDecoder {
    buffer: BytesMut,
    state: State,
    max_frame_size: u32,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8 * 1024),
            state: State::Header,
            max_frame_size,
        }
    }

    /// Append a chunk of raw bytes.
    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        if matches!(self.state, State::Finished) && !chunk.is_empty() {
            return Err(StreamError::Protocol(
                "unexpected bytes after status frame".into(),
            ));
        }
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    /// Extract the next complete frame, if one is buffered.
    ///
    /// Empty data frames are skipped.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            match self.state {
                State::Header => {
                    let Some(&tag) = self.buffer.first() else {
                        return Ok(None);
                    };
                    match tag {
                        TAG_DATA => {
                            if self.buffer.len() < DATA_HEADER_SIZE {
                                return Ok(None);
                            }
                            self.buffer.advance(1);
                            let length = self.buffer.get_u32();
                            self.check_size(length)?;
                            self.state = State::Data {
                                length: length as usize,
                            };
                        }
                        TAG_STATUS => {
                            if self.buffer.len() < STATUS_HEADER_SIZE {
                                return Ok(None);
                            }
                            self.buffer.advance(1);
                            let code = self.buffer.get_i32();
                            let length = self.buffer.get_u32();
                            self.check_size(length)?;
                            self.state = State::Status {
                                code,
                                length: length as usize,
                            };
                        }
                        other => {
                            return Err(StreamError::Protocol(format!(
                                "unknown frame tag: 0x{:02x}",
                                other
                            )));
                        }
                    }
                }
                State::Data { length } => {
                    if self.buffer.len() < length {
                        return Ok(None);
                    }
                    let payload = self.buffer.split_to(length).freeze();
                    self.state = State::Header;
                    if payload.is_empty() {
                        continue;
                    }
                    return Ok(Some(Frame::Data(payload)));
                }
                State::Status { code, length } => {
                    if self.buffer.len() < length {
                        return Ok(None);
                    }
                    let raw = self.buffer.split_to(length);
                    let message = String::from_utf8(raw.to_vec()).map_err(|_| {
                        StreamError::Protocol("status message is not valid UTF-8".into())
                    })?;
                    self.state = State::Finished;
                    if !self.buffer.is_empty() {
                        return Err(StreamError::Protocol(
                            "unexpected bytes after status frame".into(),
                        ));
                    }
                    return Ok(Some(Frame::Status(StreamStatus::new(code, message))));
                }
                State::Finished => return Ok(None),
            }
        }
    }

    /// True once the status frame has been decoded.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }

    fn check_size(&self, length: u32) -> Result<()> {
        if length > self.max_frame_size {
            return Err(StreamError::Protocol(format!(
                "frame of {} bytes exceeds maximum of {} bytes",
                length, self.max_frame_size
            )));
        }
        Ok(())
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
