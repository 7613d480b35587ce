//! Promise stream server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client                 ┌──────────────────────────────────────────────┐
//!   POST /ws/<path>        │                promise-server                 │
//!   ───────────────────────┼─▶ controller ─▶ registry (404 if unknown)     │
//!                          │       │        content type (415 if wrong)    │
//!                          │       ▼                                       │
//!   202 + framed body      │   commit 202 ─▶ duplex stream ─▶ handler      │
//!   ◀──────────────────────┼── data frames ... status frame (OK / error)   │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use promise_stream::config::{load_config, ServiceConfig};
use promise_stream::handler::HandlerRegistry;
use promise_stream::lifecycle::startup;
use promise_stream::observability::logging;
use promise_stream::samples;

#[derive(Parser)]
#[command(name = "promise-server")]
#[command(about = "Serve duplex streams over HTTP/1.1", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Enable experimental full duplex streams.
    #[arg(long)]
    full_duplex: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if cli.full_duplex {
        config.stream.full_duplex = true;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("promise-server v{} starting", env!("CARGO_PKG_VERSION"));

    let mut registry = HandlerRegistry::new();
    samples::register(&mut registry);

    startup::run(config, registry).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
