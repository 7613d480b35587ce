//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use promise_stream::config::ServiceConfig;
use promise_stream::handler::HandlerRegistry;
use promise_stream::http::HttpServer;
use promise_stream::lifecycle::Shutdown;
use promise_stream::samples;
use tokio::net::TcpListener;

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    /// Base URL of the mount point.
    pub fn url(&self) -> String {
        format!("http://{}/ws", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server with the sample handlers.
pub async fn start_server(full_duplex: bool) -> TestServer {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.stream.full_duplex = full_duplex;

    let mut registry = HandlerRegistry::new();
    samples::register(&mut registry);

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config, registry);

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Give the accept loop a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer { addr, shutdown }
}
