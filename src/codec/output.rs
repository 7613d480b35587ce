//! Output side of a stream: frames bytes into the response body.

use std::io;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::frame::{encode_data, encode_status};
use super::status::StreamStatus;
use crate::error::{Result, StreamError};

/// Receiving half, used as the HTTP response body.
pub type ResponseStream = ReceiverStream<io::Result<Bytes>>;

/// Writes data frames followed by exactly one status frame.
pub struct StreamOutput {
    tx: Option<mpsc::Sender<io::Result<Bytes>>>,
    max_frame_size: usize,
    written: u64,
}

impl StreamOutput {
    /// Create an output and the response body stream it feeds.
    ///
    /// `capacity` bounds the number of frames in flight.
    pub fn channel(capacity: usize, max_frame_size: u32) -> (Self, ResponseStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let output = Self {
            tx: Some(tx),
            max_frame_size: (max_frame_size as usize).max(1),
            written: 0,
        };
        (output, ReceiverStream::new(rx))
    }

    /// Write payload bytes, split into frames no larger than the frame limit.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(StreamError::Closed)?;
        for chunk in data.chunks(self.max_frame_size) {
            tx.send(Ok(encode_data(chunk)))
                .await
                .map_err(|_| peer_gone())?;
            self.written += chunk.len() as u64;
        }
        Ok(())
    }

    /// Append the terminal status frame and close the output.
    ///
    /// A message longer than the frame limit is cut at a character boundary
    /// so the peer's decoder accepts the frame.
    pub async fn write_status(&mut self, status: &StreamStatus) -> Result<()> {
        let tx = self.tx.take().ok_or(StreamError::Closed)?;
        let frame = if status.message.len() > self.max_frame_size {
            tracing::warn!(
                length = status.message.len(),
                max_frame_size = self.max_frame_size,
                "truncating stream status message"
            );
            let message = truncate_utf8(&status.message, self.max_frame_size);
            encode_status(&StreamStatus::new(status.code, message))
        } else {
            encode_status(status)
        };
        tx.send(Ok(frame)).await.map_err(|_| peer_gone())?;
        Ok(())
    }

    /// Payload bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_none()
    }
}

fn truncate_utf8(s: &str, max_len: usize) -> &str {
    let mut end = max_len.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn peer_gone() -> StreamError {
    StreamError::Io(io::Error::new(
        io::ErrorKind::BrokenPipe,
        "response body receiver dropped",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decoder::FrameDecoder;
    use crate::codec::frame::Frame;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_large_write_is_split() {
        let (mut output, mut body) = StreamOutput::channel(8, 4);
        output.write(b"0123456789").await.unwrap();
        output.write_status(&StreamStatus::ok()).await.unwrap();
        drop(output);

        let mut decoder = FrameDecoder::new();
        while let Some(chunk) = body.next().await {
            decoder.push(&chunk.unwrap()).unwrap();
        }

        let mut payloads = Vec::new();
        let mut status = None;
        while let Some(frame) = decoder.next_frame().unwrap() {
            match frame {
                Frame::Data(p) => payloads.push(p),
                Frame::Status(s) => status = Some(s),
            }
        }
        assert_eq!(payloads.len(), 3);
        assert_eq!(payloads.concat(), b"0123456789".to_vec());
        assert_eq!(status, Some(StreamStatus::ok()));
    }

    #[tokio::test]
    async fn test_write_after_status_is_closed() {
        let (mut output, _body) = StreamOutput::channel(8, 1024);
        output.write_status(&StreamStatus::ok()).await.unwrap();
        assert!(output.is_closed());
        assert!(matches!(output.write(b"x").await, Err(StreamError::Closed)));
        assert!(matches!(
            output.write_status(&StreamStatus::ok()).await,
            Err(StreamError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_long_status_message_fits_frame_limit() {
        let (mut output, mut body) = StreamOutput::channel(8, 4);
        output
            .write_status(&StreamStatus::new(500, "h\u{e9}llo world"))
            .await
            .unwrap();
        drop(output);

        let mut decoder = FrameDecoder::with_max_frame_size(4);
        while let Some(chunk) = body.next().await {
            decoder.push(&chunk.unwrap()).unwrap();
        }
        assert_eq!(
            decoder.next_frame().unwrap(),
            Some(Frame::Status(StreamStatus::new(500, "h\u{e9}l")))
        );
    }

    #[test]
    fn test_truncate_utf8_respects_char_boundaries() {
        assert_eq!(truncate_utf8("h\u{e9}llo", 2), "h");
        assert_eq!(truncate_utf8("h\u{e9}llo", 3), "h\u{e9}");
        assert_eq!(truncate_utf8("abc", 10), "abc");
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_broken_pipe() {
        let (mut output, body) = StreamOutput::channel(1, 1024);
        drop(body);
        match output.write(b"x").await {
            Err(StreamError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected broken pipe, got {:?}", other),
        }
    }
}
