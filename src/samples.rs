//! Sample stream handlers served by the `promise-server` binary.
//!
//! | Path             | Behaviour                                          |
//! |------------------|----------------------------------------------------|
//! | `/bytes`         | writes numbered text lines                         |
//! | `/echo`          | writes the input back                              |
//! | `/entity`        | reads a JSON object, writes it back with extras    |
//! | `/objects`       | writes a sequence of newline-delimited JSON objects|
//! | `/client-error`  | fails as if the request was invalid                |
//! | `/server-error`  | fails as if processing broke                       |

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::error::StreamError;
use crate::handler::{BoxFuture, HandlerRegistry, HandlerResult, StreamHandler};
use crate::stream::{DuplexMode, DuplexStream};

/// Register every sample handler.
pub fn register(registry: &mut HandlerRegistry) {
    registry
        .register("/bytes", BytesHandler { lines: 10_000 })
        .register("/echo", EchoHandler)
        .register("/entity", EntityHandler)
        .register("/objects", ObjectsHandler { count: 100 })
        .register("/client-error", ClientErrorHandler)
        .register("/server-error", ServerErrorHandler);
}

/// Writes `test-<n>` lines, ignoring the input.
pub struct BytesHandler {
    pub lines: usize,
}

impl StreamHandler for BytesHandler {
    fn handle<'a>(
        &'a self,
        _method: &'a Method,
        stream: &'a mut DuplexStream,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let mut batch = String::with_capacity(8 * 1024);
            for n in 0..self.lines {
                batch.push_str("test-");
                batch.push_str(&n.to_string());
                batch.push('\n');
                if batch.len() >= 8 * 1024 {
                    stream.write(batch.as_bytes()).await?;
                    batch.clear();
                }
            }
            if !batch.is_empty() {
                stream.write(batch.as_bytes()).await?;
            }
            Ok(())
        })
    }
}

/// Writes the input back.
///
/// In full duplex mode every chunk is echoed as soon as it arrives; in half
/// duplex mode the whole input is read first.
pub struct EchoHandler;

impl StreamHandler for EchoHandler {
    fn handle<'a>(
        &'a self,
        _method: &'a Method,
        stream: &'a mut DuplexStream,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            match stream.mode() {
                DuplexMode::Full => {
                    while let Some(chunk) = stream.read().await? {
                        stream.write(&chunk).await?;
                    }
                    Ok(())
                }
                DuplexMode::Half => {
                    let input = stream.read_to_end().await?;
                    stream.write(&input).await
                }
            }
        })
    }
}

/// Request entity of the `/entity` sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRequest {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Response entity of the `/entity` sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityResponse {
    pub name: String,
    pub tags: Vec<String>,
    pub method: String,
    pub greeting: String,
}

/// Reads a JSON entity and writes an enriched one.
pub struct EntityHandler;

impl StreamHandler for EntityHandler {
    fn handle<'a>(
        &'a self,
        method: &'a Method,
        stream: &'a mut DuplexStream,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let input = stream.read_to_end().await?;
            let request: EntityRequest = serde_json::from_slice(&input)
                .map_err(|e| StreamError::handler(format!("invalid entity: {}", e)))?;

            let response = EntityResponse {
                greeting: format!("hello, {}", request.name),
                name: request.name,
                tags: request.tags,
                method: method.to_string(),
            };
            let body = serde_json::to_vec(&response)
                .map_err(|e| StreamError::handler(format!("unable to encode entity: {}", e)))?;
            stream.write(&body).await
        })
    }
}

/// One element of the `/objects` sample output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleObject {
    pub id: usize,
    pub label: String,
}

/// Writes newline-delimited JSON objects.
pub struct ObjectsHandler {
    pub count: usize,
}

impl StreamHandler for ObjectsHandler {
    fn handle<'a>(
        &'a self,
        _method: &'a Method,
        stream: &'a mut DuplexStream,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            for id in 0..self.count {
                let object = SampleObject {
                    id,
                    label: format!("object-{}", id),
                };
                let mut line = serde_json::to_vec(&object)
                    .map_err(|e| StreamError::handler(e.to_string()))?;
                line.push(b'\n');
                stream.write(&line).await?;
            }
            Ok(())
        })
    }
}

/// Fails the way a handler rejecting its input would.
pub struct ClientErrorHandler;

impl StreamHandler for ClientErrorHandler {
    fn handle<'a>(
        &'a self,
        _method: &'a Method,
        stream: &'a mut DuplexStream,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let input = stream.read_to_end().await?;
            Err(StreamError::handler(format!(
                "invalid request: {} unexpected bytes",
                input.len()
            )))
        })
    }
}

/// Fails halfway through writing the response.
pub struct ServerErrorHandler;

impl StreamHandler for ServerErrorHandler {
    fn handle<'a>(
        &'a self,
        _method: &'a Method,
        stream: &'a mut DuplexStream,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            stream.write(b"partial response\n").await?;
            Err(StreamError::handler("server error while processing stream"))
        })
    }
}
