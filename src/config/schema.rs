//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the stream
//! server. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::codec::DEFAULT_MAX_FRAME_SIZE;

/// Root configuration for the stream server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Path prefix handlers are resolved relative to (e.g., "/ws").
    pub mount_path: String,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Duplex stream settings.
    pub stream: StreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mount_path: "/ws".to_string(),
            listener: ListenerConfig::default(),
            stream: StreamConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Duplex stream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Allow reading and writing at the same time (experimental, not
    /// supported by HTTP/1.1 semantics). Half duplex when false.
    pub full_duplex: bool,

    /// Maximum payload of a single frame in bytes.
    pub max_frame_size: u32,

    /// Response frames buffered before writes wait on the peer.
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            full_duplex: false,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            channel_capacity: 16,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed until the response head is sent, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 300 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.mount_path, "/ws");
        assert!(!config.stream.full_duplex);
        assert_eq!(config.stream.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_sections() {
        let config: ServiceConfig = toml::from_str(
            r#"
            mount_path = "/streams"

            [stream]
            full_duplex = true

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.mount_path, "/streams");
        assert!(config.stream.full_duplex);
        assert_eq!(config.stream.channel_capacity, 16);
        assert_eq!(config.observability.log_level, "debug");
        assert!(!config.observability.metrics_enabled);
    }
}
