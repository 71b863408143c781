//! Common types and utilities for the finance gateway
//!
//! This library contains the types shared between the terminal connector and
//! the HTTP gateway: the error taxonomy, request validation and the record
//! model used to carry terminal data back to JSON.

pub mod error;
pub mod model;

/// Re-export important types
pub use error::{Error, NativeError, Result};
pub use model::{
    AccountInfoRequest, Credentials, DateRange, FieldValue, HistoryQuery, HistoryRequest, Record,
};

// Re-export utoipa for use in model ToSchema derives
#[cfg(feature = "utoipa")]
pub use utoipa;
