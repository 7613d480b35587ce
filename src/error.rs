//! Error types for stream processing.
//!
//! Errors are split by the commit boundary: [`ServiceError`] is reported as an
//! HTTP status before the request is accepted, [`StreamError`] is reported in
//! the terminal status frame after it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors raised while reading, writing or finishing a duplex stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Transport failure on the request or response body.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed frame on the wire.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The peer finished its side of the stream with an error status.
    #[error("remote error (code={code}): {message}")]
    Remote { code: i32, message: String },

    /// Reading was attempted after a half duplex stream switched to writing.
    #[error("stream is in writing mode, reading is no longer possible")]
    ReadAfterWrite,

    /// The stream was already finished.
    #[error("stream already finished")]
    AlreadyFinished,

    /// The output side was closed by a terminal status frame.
    #[error("stream output closed")]
    Closed,

    /// Failure raised by handler logic.
    #[error("{0}")]
    Handler(String),
}

impl StreamError {
    /// Build an ordinary handler failure.
    pub fn handler(message: impl Into<String>) -> Self {
        StreamError::Handler(message.into())
    }
}

/// Result type alias using StreamError.
pub type Result<T> = std::result::Result<T, StreamError>;

/// Failures before the request is accepted, mapped to HTTP status codes.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No handler registered for the relative path.
    #[error("no stream handler found for uri: {0}")]
    NotFound(String),

    /// Declared content type is not the protocol media type.
    #[error("unsupported content type: {0}")]
    UnsupportedMediaType(String),

    /// Anything unexpected before the response was committed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_status() {
        assert_eq!(ServiceError::NotFound("/x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::UnsupportedMediaType("text/plain".into()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ServiceError::Internal("oops".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_handler_error_message_is_verbatim() {
        assert_eq!(StreamError::handler("boom").to_string(), "boom");
    }
}
