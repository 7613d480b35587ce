//! Wire format encoding.
//!
//! Both the request body and the response body are a sequence of frames:
//! ```text
//! data frame:    ┌──────┬──────────┬─────────────┐
//!                │ 0x01 │ Length   │ Payload     │
//!                │ 1 B  │ u32 BE   │ Length B    │
//!                └──────┴──────────┴─────────────┘
//! status frame:  ┌──────┬──────────┬──────────┬─────────────┐
//!                │ 0x00 │ Code     │ Length   │ Message     │
//!                │ 1 B  │ i32 BE   │ u32 BE   │ UTF-8       │
//!                └──────┴──────────┴──────────┴─────────────┘
//! ```
//!
//! The status frame marks the end of the stream. Nothing may follow it.

use bytes::{BufMut, Bytes, BytesMut};

use super::status::StreamStatus;

/// Tag byte of a status frame.
pub const TAG_STATUS: u8 = 0x00;

/// Tag byte of a data frame.
pub const TAG_DATA: u8 = 0x01;

/// Tag and length.
pub const DATA_HEADER_SIZE: usize = 5;

/// Tag, code and message length.
pub const STATUS_HEADER_SIZE: usize = 9;

/// Default maximum payload of a single frame (1 MB).
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 1024 * 1024;

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Data(Bytes),
    Status(StreamStatus),
}

/// Encode a single data frame.
///
/// Callers are responsible for keeping `payload` within the frame limit.
pub fn encode_data(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(DATA_HEADER_SIZE + payload.len());
    buf.put_u8(TAG_DATA);
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);
    buf.freeze()
}

/// Encode a terminal status frame.
pub fn encode_status(status: &StreamStatus) -> Bytes {
    let message = status.message.as_bytes();
    let mut buf = BytesMut::with_capacity(STATUS_HEADER_SIZE + message.len());
    buf.put_u8(TAG_STATUS);
    buf.put_i32(status.code);
    buf.put_u32(message.len() as u32);
    buf.put_slice(message);
    buf.freeze()
}
