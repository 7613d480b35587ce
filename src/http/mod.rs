//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → controller.rs (resolve handler, validate, commit 202)
//!     → stream task (handler over duplex stream, finish)
//!     → framed response body → client
//! ```

pub mod controller;
pub mod headers;
pub mod server;

pub use server::{AppState, HttpServer, StreamSettings};
