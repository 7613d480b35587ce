//! Client for the stream protocol.
//!
//! Frames a request payload, posts it to a stream handler and decodes the
//! response body up to its terminal status.

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::{header, Method, StatusCode};
use thiserror::Error;

use crate::codec::{
    encode_data, encode_status, Frame, FrameDecoder, StreamStatus, CONTENT_TYPE,
    DEFAULT_MAX_FRAME_SIZE,
};
use crate::error::StreamError;

/// Error type for client calls.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server refused the request before accepting it.
    #[error("request rejected with HTTP status {0}")]
    Rejected(StatusCode),

    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// The response body ended without a terminal status frame.
    #[error("response ended without a status frame")]
    MissingStatus,
}

/// Decoded response of an accepted stream request.
#[derive(Debug, Clone)]
pub struct StreamResponse {
    pub payload: Bytes,
    pub status: StreamStatus,
}

/// Client bound to the mount point of a stream server (e.g. `http://host:8080/ws`).
pub struct StreamClient {
    client: reqwest::Client,
    base_url: String,
    max_frame_size: u32,
    max_response_frame_size: u32,
}

impl StreamClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            max_response_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Largest data frame the request payload is split into.
    pub fn with_max_frame_size(mut self, max_frame_size: u32) -> Self {
        self.max_frame_size = max_frame_size.max(1);
        self
    }

    /// Largest response frame accepted from the server.
    pub fn with_max_response_frame_size(mut self, max_frame_size: u32) -> Self {
        self.max_response_frame_size = max_frame_size.max(1);
        self
    }

    /// POST `payload` to the handler at `path`.
    pub async fn send(&self, path: &str, payload: &[u8]) -> Result<StreamResponse, ClientError> {
        self.send_with_method(Method::POST, path, payload).await
    }

    pub async fn send_with_method(
        &self,
        method: Method,
        path: &str,
        payload: &[u8],
    ) -> Result<StreamResponse, ClientError> {
        let body = encode_request(payload, self.max_frame_size);
        let response = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header(header::CONTENT_TYPE, CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            return Err(ClientError::Rejected(status));
        }

        let mut decoder = FrameDecoder::with_max_frame_size(self.max_response_frame_size);
        let mut payload = BytesMut::new();
        let mut stream_status = None;
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            decoder.push(&chunk?)?;
            while let Some(frame) = decoder.next_frame()? {
                match frame {
                    Frame::Data(data) => payload.extend_from_slice(&data),
                    Frame::Status(s) => stream_status = Some(s),
                }
            }
        }

        let status = stream_status.ok_or(ClientError::MissingStatus)?;
        tracing::debug!(status = %status, bytes = payload.len(), "stream response decoded");
        Ok(StreamResponse {
            payload: payload.freeze(),
            status,
        })
    }
}

/// Frame a request payload followed by the success status.
pub fn encode_request(payload: &[u8], max_frame_size: u32) -> Vec<u8> {
    let mut body = Vec::with_capacity(payload.len() + 64);
    for chunk in payload.chunks(max_frame_size.max(1) as usize) {
        body.extend_from_slice(&encode_data(chunk));
    }
    body.extend_from_slice(&encode_status(&StreamStatus::ok()));
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_request_splits_frames() {
        let body = encode_request(b"abcdef", 4);

        let mut decoder = FrameDecoder::new();
        decoder.push(&body).unwrap();
        assert_eq!(
            decoder.next_frame().unwrap(),
            Some(Frame::Data(Bytes::from_static(b"abcd")))
        );
        assert_eq!(
            decoder.next_frame().unwrap(),
            Some(Frame::Data(Bytes::from_static(b"ef")))
        );
        assert_eq!(
            decoder.next_frame().unwrap(),
            Some(Frame::Status(StreamStatus::ok()))
        );
    }

    #[test]
    fn test_empty_request_is_status_only() {
        let body = encode_request(b"", 1024);
        assert_eq!(body, encode_status(&StreamStatus::ok()).to_vec());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = StreamClient::new("http://localhost:8080/ws/");
        assert_eq!(client.base_url, "http://localhost:8080/ws");
    }

    #[test]
    fn test_request_and_response_limits_are_separate() {
        let client = StreamClient::new("http://localhost:8080/ws").with_max_frame_size(16);
        assert_eq!(client.max_frame_size, 16);
        assert_eq!(client.max_response_frame_size, DEFAULT_MAX_FRAME_SIZE);

        let client = client.with_max_response_frame_size(0);
        assert_eq!(client.max_response_frame_size, 1);
        assert_eq!(client.max_frame_size, 16);
    }
}
