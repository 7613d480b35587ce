//! Stream handler contracts.
//!
//! A handler receives the HTTP method and a [`DuplexStream`], reads the
//! request from the stream, processes it and writes the response back. Any
//! error it returns is reported in the terminal status of the stream.
//!
//! # Example
//!
//! ```ignore
//! use promise_stream::handler::{BoxFuture, HandlerResult, StreamHandler};
//!
//! struct Echo;
//!
//! impl StreamHandler for Echo {
//!     fn handle<'a>(&'a self, _method: &'a Method, stream: &'a mut DuplexStream)
//!         -> BoxFuture<'a, HandlerResult>
//!     {
//!         Box::pin(async move {
//!             let input = stream.read_to_end().await?;
//!             stream.write(&input).await
//!         })
//!     }
//! }
//! ```

mod registry;
mod request;

use axum::http::Method;

use crate::error::Result;
use crate::stream::DuplexStream;

pub use futures_util::future::BoxFuture;
pub use registry::HandlerRegistry;
pub use request::{relative_path, StreamRequest};

/// Result type for handler functions.
pub type HandlerResult = Result<()>;

/// Unit of user logic bound to a path.
pub trait StreamHandler: Send + Sync + 'static {
    /// Process the stream. Errors are reported in the stream output status.
    fn handle<'a>(
        &'a self,
        method: &'a Method,
        stream: &'a mut DuplexStream,
    ) -> BoxFuture<'a, HandlerResult>;
}
