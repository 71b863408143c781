//! Error types for the finance gateway
//!
//! This module provides the error taxonomy shared by the connector layer and
//! the HTTP gateway. Every failure a request can hit is one of these variants,
//! and the gateway maps each variant to exactly one HTTP status.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Last-error pair reported by the trading terminal
///
/// Serialized as `[code, "message"]`, the same shape the terminal library
/// hands back from its last-error accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i64, String)", into = "(i64, String)")]
pub struct NativeError {
    /// Terminal result code
    pub code: i64,
    /// Terminal description of the code
    pub message: String,
}

impl NativeError {
    /// Generic success
    pub const RES_S_OK: i64 = 1;
    /// Generic failure
    pub const RES_E_FAIL: i64 = -1;
    /// IPC send failed
    pub const RES_E_INTERNAL_FAIL_SEND: i64 = -10001;
    /// IPC receive failed
    pub const RES_E_INTERNAL_FAIL_RECEIVE: i64 = -10002;
    /// IPC timed out
    pub const RES_E_INTERNAL_FAIL_TIMEOUT: i64 = -10005;

    /// Create a new native error
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The "no error" value
    pub fn success() -> Self {
        Self::new(Self::RES_S_OK, "Success")
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, '{}')", self.code, self.message)
    }
}

impl From<(i64, String)> for NativeError {
    fn from((code, message): (i64, String)) -> Self {
        Self { code, message }
    }
}

impl From<NativeError> for (i64, String) {
    fn from(err: NativeError) -> Self {
        (err.code, err.message)
    }
}

/// Finance gateway error type
#[derive(Debug, Error)]
pub enum Error {
    /// The request carried no usable JSON body
    #[error("Request body is required")]
    MissingBody,

    /// A request field is missing, mistyped or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// The terminal session could not be opened
    #[error("MT5 init failed: {0}")]
    Connection(NativeError),

    /// The session opened but the terminal returned no data
    #[error("{message}")]
    Fetch {
        message: String,
        native: NativeError,
    },

    /// The terminal returned no result object for a query
    #[error("{message}")]
    NotFound {
        message: String,
        native: NativeError,
    },

    /// Any other failure while handling a request
    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// The terminal's own error detail, when the failure came from the terminal
    pub fn native(&self) -> Option<&NativeError> {
        match self {
            Error::Connection(native) => Some(native),
            Error::Fetch { native, .. } | Error::NotFound { native, .. } => Some(native),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
