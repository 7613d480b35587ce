//! Duplex byte streams tunnelled through a single HTTP/1.1 request/response.
//!
//! A client uploads a framed request body and receives a framed response body
//! that ends with an explicit terminal status, because the HTTP status line is
//! committed (202 Accepted) before any handler logic runs.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod samples;
pub mod stream;

pub use config::ServiceConfig;
pub use error::{ServiceError, StreamError};
pub use handler::{HandlerRegistry, StreamHandler};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use stream::{DuplexMode, DuplexStream};
