//! Request lifecycle controller.
//!
//! # Responsibilities
//! - Resolve the stream handler for the relative path (404 if none)
//! - Check the declared content type (415 if wrong)
//! - Set protocol headers and accept the request with 202
//! - Run the handler over a duplex stream and finish the stream
//!
//! # Commit Boundary
//! Once the 202 response head is built the HTTP status is fixed. Every later
//! failure (handler, codec, stream bookkeeping) is reported in the terminal
//! status frame of the response body, never as an HTTP status.

use std::any::Any;
use std::io;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{FutureExt, StreamExt, TryStreamExt};
use tracing::{Instrument, Span};

use crate::codec::{FramedCodec, StreamInput, StreamOutput, STATUS_ERROR};
use crate::error::{ServiceError, StreamError};
use crate::handler::{StreamHandler, StreamRequest};
use crate::http::headers;
use crate::http::server::AppState;
use crate::observability::metrics::{self, Outcome};
use crate::stream::DuplexStream;

/// Entry point for every stream request.
pub async fn handle_stream(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let span = tracing::info_span!(
        "stream",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri().path(),
    );

    match accept(&state, request, span.clone(), start) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(parent: &span, error = %e, "aborting stream request");
            metrics::record_request(e.status().as_u16(), Outcome::Rejected, start);
            let mut response = e.into_response();
            headers::apply_common(response.headers_mut());
            response
        }
    }
}

/// Validate the request, commit to 202 and start the handler task.
fn accept(
    state: &AppState,
    request: Request<Body>,
    span: Span,
    start: Instant,
) -> Result<Response, ServiceError> {
    let (parts, body) = request.into_parts();
    let stream_request = StreamRequest::from_parts(&parts, &state.mount_path);
    tracing::info!(
        parent: &span,
        path = stream_request.path.as_deref().unwrap_or("-"),
        "processing stream request"
    );

    let handler = stream_request
        .path
        .as_deref()
        .and_then(|path| state.registry.resolve(path))
        .ok_or_else(|| ServiceError::NotFound(parts.uri.path().to_string()))?;

    if !stream_request.has_protocol_content_type() {
        return Err(ServiceError::UnsupportedMediaType(
            stream_request
                .content_type
                .clone()
                .unwrap_or_else(|| "<none>".to_string()),
        ));
    }

    let settings = state.settings;
    let (output, response_body) = StreamOutput::channel(settings.channel_capacity, settings.max_frame_size);

    let mut response = Response::builder()
        .status(StatusCode::ACCEPTED)
        .body(Body::from_stream(response_body))
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    headers::apply_common(response.headers_mut());
    headers::apply_stream(response.headers_mut());

    // Beyond this point the request has been accepted; failures go into the
    // stream status, not the HTTP status.
    tracing::debug!(parent: &span, "accepted stream request");

    let body = body.into_data_stream().map_err(io::Error::other).boxed();
    let input = StreamInput::new(body, settings.max_frame_size);
    let codec = FramedCodec::new(input, output);
    let stream = DuplexStream::new(Box::new(codec), settings.mode, span.clone());

    tokio::spawn(
        run_stream(handler, stream_request.method, stream, span.clone(), start).instrument(span),
    );

    Ok(response)
}

/// Run the handler and finish the stream with its outcome.
async fn run_stream(
    handler: Arc<dyn StreamHandler>,
    method: Method,
    mut stream: DuplexStream,
    span: Span,
    start: Instant,
) {
    metrics::stream_started();
    tracing::debug!(parent: &span, mode = ?stream.mode(), "handling stream request");

    let result = AssertUnwindSafe(handler.handle(&method, &mut stream))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(StreamError::handler(panic_message(panic.as_ref()))));

    let finished = match result {
        Ok(()) => stream.finish_success().await.map(|_| Outcome::Success),
        Err(e) => {
            tracing::error!(parent: &span, error = %e, "error while handling stream");
            stream
                .finish_error(STATUS_ERROR, &e.to_string())
                .await
                .map(|_| Outcome::Error)
        }
    };

    // No channel is left to report a failed finish through.
    let outcome = finished.unwrap_or_else(|e| {
        tracing::error!(parent: &span, error = %e, "unable to send stream status");
        Outcome::Aborted
    });

    metrics::stream_ended();
    metrics::record_request(StatusCode::ACCEPTED.as_u16(), outcome, start);
    tracing::info!(
        parent: &span,
        outcome = outcome.as_str(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "processed stream request"
    );
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("handler panicked: {}", s)
    } else {
        "handler panicked".to_string()
    }
}
