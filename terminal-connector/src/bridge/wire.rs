//! Wire types of the MT5 bridge protocol
//!
//! The bridge answers every call with either `{"result": <data>}` or
//! `{"error": "<message>"}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use common::NativeError;

/// Response envelope returned by every bridge endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BridgeResponse<T> {
    // Must stay first: a `null` result would otherwise also match an `error` body
    Failure { error: String },
    Success { result: T },
}

impl<T> BridgeResponse<T> {
    /// Turn the envelope into a result
    pub fn into_result(self) -> Result<T, BridgeError> {
        match self {
            BridgeResponse::Success { result } => Ok(result),
            BridgeResponse::Failure { error } => Err(BridgeError::Bridge(error)),
        }
    }
}

/// Body of `POST /initialize`
#[derive(Debug, Serialize)]
pub struct InitializeParams<'a> {
    pub path: &'a str,
    pub login: i64,
    pub password: &'a str,
    pub server: &'a str,
    pub portable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Query of `GET /history_deals_get`, bounds in Unix seconds
#[derive(Debug, Serialize)]
pub struct DealsQuery {
    pub date_from: i64,
    pub date_to: i64,
}

/// Bridge transport errors
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Connection error: {0}")]
    Send(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Response error: {0}")]
    Receive(String),

    #[error("Bridge error: {0}")]
    Bridge(String),
}

impl BridgeError {
    /// Express the failure the way the terminal reports its own errors
    pub fn native(&self) -> NativeError {
        match self {
            BridgeError::Send(msg) => NativeError::new(
                NativeError::RES_E_INTERNAL_FAIL_SEND,
                format!("IPC send failed: {msg}"),
            ),
            BridgeError::Timeout(msg) => NativeError::new(
                NativeError::RES_E_INTERNAL_FAIL_TIMEOUT,
                format!("IPC timeout: {msg}"),
            ),
            BridgeError::Receive(msg) => NativeError::new(
                NativeError::RES_E_INTERNAL_FAIL_RECEIVE,
                format!("IPC recv failed: {msg}"),
            ),
            BridgeError::Bridge(msg) => NativeError::new(NativeError::RES_E_FAIL, msg.clone()),
        }
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BridgeError::Timeout(err.to_string())
        } else if err.is_decode() || err.is_body() {
            BridgeError::Receive(err.to_string())
        } else {
            BridgeError::Send(err.to_string())
        }
    }
}
