//! MT5 bridge connector
//!
//! The terminal runs as a Windows process (natively or under Wine) with a
//! small HTTP bridge next to it that exposes the terminal library calls.
//! [`Mt5BridgeConnector`] speaks that bridge's JSON protocol. Transport
//! failures are folded into the terminal's own error reporting: the failing
//! call returns `false`/`None` and `last_error` reports an IPC error code.

pub mod wire;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use common::{Credentials, NativeError, Record};

use crate::connector::TerminalConnector;
pub use wire::{BridgeError, BridgeResponse, DealsQuery, InitializeParams};

/// Default bridge address
pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:5000";

/// Default terminal executable path
pub const DEFAULT_TERMINAL_PATH: &str = r"C:\Program Files\MetaTrader 5\terminal64.exe";

/// Bridge connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Base URL of the bridge
    pub base_url: String,
    /// Terminal executable the bridge should attach to
    pub terminal_path: String,
    /// Start the terminal in portable mode
    pub portable: bool,
    /// Terminal login timeout in milliseconds, terminal default when unset
    pub login_timeout_ms: Option<u64>,
    /// HTTP timeout per bridge call, none when unset
    pub http_timeout: Option<Duration>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BRIDGE_URL.to_string(),
            terminal_path: DEFAULT_TERMINAL_PATH.to_string(),
            portable: false,
            login_timeout_ms: None,
            http_timeout: None,
        }
    }
}

/// Terminal connector backed by the MT5 HTTP bridge
pub struct Mt5BridgeConnector {
    client: Client,
    config: BridgeConfig,
    transport_error: Option<NativeError>,
}

impl Mt5BridgeConnector {
    /// Create a connector for the bridge described by `config`
    pub fn new(config: BridgeConfig) -> Result<Self, BridgeError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BridgeError::Send(e.to_string()))?;

        Ok(Self {
            client,
            config,
            transport_error: None,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BridgeError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<BridgeResponse<T>>(&body) {
            Ok(envelope) => envelope.into_result(),
            Err(e) if status.is_success() => Err(BridgeError::Receive(e.to_string())),
            Err(_) => Err(BridgeError::Receive(format!("HTTP {status}: {body}"))),
        }
    }

    /// Remember a transport failure so `last_error` can report it
    fn record<T>(&mut self, call: &str, result: Result<T, BridgeError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("MT5 bridge call {} failed: {}", call, e);
                self.transport_error = Some(e.native());
                None
            }
        }
    }
}

#[async_trait]
impl TerminalConnector for Mt5BridgeConnector {
    async fn initialize(&mut self, credentials: &Credentials) -> bool {
        self.transport_error = None;

        let params = InitializeParams {
            path: &self.config.terminal_path,
            login: credentials.login,
            password: &credentials.password,
            server: &credentials.server,
            portable: self.config.portable,
            timeout: self.config.login_timeout_ms,
        };
        let request = self.client.post(self.url("initialize")).json(&params);
        let result = self.call::<bool>(request).await;

        self.record("initialize", result).unwrap_or(false)
    }

    async fn last_error(&mut self) -> NativeError {
        if let Some(error) = &self.transport_error {
            return error.clone();
        }

        let request = self.client.get(self.url("last_error"));
        match self.call::<NativeError>(request).await {
            Ok(error) => error,
            Err(e) => e.native(),
        }
    }

    async fn account_info(&mut self) -> Option<Record> {
        let request = self.client.get(self.url("account_info"));
        let result = self.call::<Option<Record>>(request).await;
        self.record("account_info", result).flatten()
    }

    async fn history_deals_get(
        &mut self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Option<Vec<Record>> {
        let query = DealsQuery {
            date_from: Utc.from_utc_datetime(&from).timestamp(),
            date_to: Utc.from_utc_datetime(&to).timestamp(),
        };
        debug!(
            date_from = query.date_from,
            date_to = query.date_to,
            "Requesting deal history"
        );

        let request = self.client.get(self.url("history_deals_get")).query(&query);
        let result = self.call::<Option<Vec<Record>>>(request).await;
        self.record("history_deals_get", result).flatten()
    }

    async fn shutdown(&mut self) {
        let request = self.client.post(self.url("shutdown"));
        if let Err(e) = self.call::<bool>(request).await {
            warn!("MT5 bridge shutdown failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let connector = Mt5BridgeConnector::new(BridgeConfig {
            base_url: "http://bridge:5000/".to_string(),
            ..BridgeConfig::default()
        })
        .unwrap();
        assert_eq!(connector.url("account_info"), "http://bridge:5000/account_info");
    }
}
