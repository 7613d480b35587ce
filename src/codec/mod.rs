//! Stream codec subsystem.
//!
//! # Data Flow
//! ```text
//! request body chunks
//!     → decoder.rs (frame state machine)
//!     → input.rs (data payloads, peer status)
//!     → duplex stream / handler
//!     → output.rs (data frames, terminal status)
//!     → response body channel
//! ```
//!
//! # Design Decisions
//! - Same framing in both directions
//! - The status frame doubles as the end-of-stream marker
//! - Duplex streams only see the [`StreamCodec`] contract

mod decoder;
mod frame;
mod input;
mod output;
mod status;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::error::Result;

pub use decoder::FrameDecoder;
pub use frame::{encode_data, encode_status, Frame, DEFAULT_MAX_FRAME_SIZE};
pub use input::{BodyStream, StreamInput};
pub use output::{ResponseStream, StreamOutput};
pub use status::{StreamStatus, STATUS_ERROR, STATUS_OK};

/// Media type identifying the protocol, for both request and response bodies.
pub const CONTENT_TYPE: &str = "application/x-promise-stream";

/// Contract between a duplex stream and the framed transport.
pub trait StreamCodec: Send {
    /// Read the next payload, `None` once the peer finished.
    fn read(&mut self) -> BoxFuture<'_, Result<Option<Bytes>>>;

    /// Write payload bytes.
    fn write<'a>(&'a mut self, data: &'a [u8]) -> BoxFuture<'a, Result<()>>;

    /// Read and discard all unread input, returning the discarded byte count.
    fn drain_remaining(&mut self) -> BoxFuture<'_, Result<u64>>;

    /// Append the end-of-stream marker with the given status.
    fn write_status<'a>(&'a mut self, status: &'a StreamStatus) -> BoxFuture<'a, Result<()>>;
}

/// Codec over a framed request body and a framed response channel.
pub struct FramedCodec {
    input: StreamInput,
    output: StreamOutput,
}

impl FramedCodec {
    pub fn new(input: StreamInput, output: StreamOutput) -> Self {
        Self { input, output }
    }

    pub fn bytes_written(&self) -> u64 {
        self.output.bytes_written()
    }
}

impl StreamCodec for FramedCodec {
    fn read(&mut self) -> BoxFuture<'_, Result<Option<Bytes>>> {
        self.input.read().boxed()
    }

    fn write<'a>(&'a mut self, data: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        self.output.write(data).boxed()
    }

    fn drain_remaining(&mut self) -> BoxFuture<'_, Result<u64>> {
        self.input.drain_remaining().boxed()
    }

    fn write_status<'a>(&'a mut self, status: &'a StreamStatus) -> BoxFuture<'a, Result<()>> {
        self.output.write_status(status).boxed()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording codec used by the duplex stream tests.

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// One observed codec call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Read,
        Write(Vec<u8>),
        Drain,
        Status(StreamStatus),
    }

    /// Codec that serves canned input and records every call.
    pub struct RecordingCodec {
        input: VecDeque<Bytes>,
        calls: Arc<Mutex<Vec<Call>>>,
        fail_status: bool,
        fail_first_drain: bool,
    }

    impl RecordingCodec {
        pub fn new(input: &[&'static [u8]]) -> (Self, Arc<Mutex<Vec<Call>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let codec = Self {
                input: input.iter().copied().map(Bytes::from_static).collect(),
                calls: calls.clone(),
                fail_status: false,
                fail_first_drain: false,
            };
            (codec, calls)
        }

        pub fn failing_status(mut self) -> Self {
            self.fail_status = true;
            self
        }

        /// The first drain fails with a remote error and consumes nothing.
        pub fn failing_first_drain(mut self) -> Self {
            self.fail_first_drain = true;
            self
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl StreamCodec for RecordingCodec {
        fn read(&mut self) -> BoxFuture<'_, Result<Option<Bytes>>> {
            self.record(Call::Read);
            let next = self.input.pop_front();
            async move { Ok(next) }.boxed()
        }

        fn write<'a>(&'a mut self, data: &'a [u8]) -> BoxFuture<'a, Result<()>> {
            self.record(Call::Write(data.to_vec()));
            async { Ok(()) }.boxed()
        }

        fn drain_remaining(&mut self) -> BoxFuture<'_, Result<u64>> {
            self.record(Call::Drain);
            if std::mem::take(&mut self.fail_first_drain) {
                return async {
                    Err(crate::error::StreamError::Remote {
                        code: STATUS_ERROR,
                        message: "client failed".into(),
                    })
                }
                .boxed();
            }
            let discarded = self.input.drain(..).map(|b| b.len() as u64).sum();
            async move { Ok(discarded) }.boxed()
        }

        fn write_status<'a>(&'a mut self, status: &'a StreamStatus) -> BoxFuture<'a, Result<()>> {
            self.record(Call::Status(status.clone()));
            let fail = self.fail_status;
            async move {
                if fail {
                    Err(crate::error::StreamError::Io(std::io::Error::new(
                        std::io::ErrorKind::BrokenPipe,
                        "peer gone",
                    )))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }
    }
}
