//! Application configuration

use std::env;
use std::time::Duration;

use terminal_connector::bridge::{BridgeConfig, DEFAULT_BRIDGE_URL, DEFAULT_TERMINAL_PATH};

/// Service name reported by the health endpoint
pub const DEFAULT_SERVICE_NAME: &str = "Finance MCP API";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    Pretty,
    /// One JSON object per line
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listening host
    pub host: String,
    /// API port
    pub port: u16,
    /// Service name reported by the health endpoint
    pub service_name: String,
    /// Log output format
    pub log_format: LogFormat,
    /// MT5 bridge settings
    pub bridge: BridgeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    /// Create a new configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create a configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| {
            lookup(key)
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false)
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8386),
            service_name: lookup("SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            bridge: BridgeConfig {
                base_url: lookup("MT5_BRIDGE_URL")
                    .unwrap_or_else(|| DEFAULT_BRIDGE_URL.to_string()),
                terminal_path: lookup("MT5_TERMINAL_PATH")
                    .unwrap_or_else(|| DEFAULT_TERMINAL_PATH.to_string()),
                portable: flag("MT5_PORTABLE"),
                login_timeout_ms: lookup("MT5_TIMEOUT_MS").and_then(|t| t.parse().ok()),
                http_timeout: lookup("MT5_BRIDGE_TIMEOUT_SECS")
                    .and_then(|t| t.parse().ok())
                    .map(Duration::from_secs),
            },
        }
    }

    /// Address the HTTP server binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
