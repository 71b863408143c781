//! Standardized API response formats
//!
//! Every body the gateway produces carries a `status` field: `success` for
//! data responses, `healthy` for the health check and `error` for failures
//! (see [`ErrorResponse`](crate::error::ErrorResponse)).

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use common::Record;

/// Outcome marker carried by every response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Healthy,
    Error,
}

/// Account info response
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountInfoResponse {
    /// Always `success`
    pub status: ResponseStatus,
    /// Account snapshot as reported by the terminal
    #[schema(value_type = Object)]
    pub data: Record,
}

impl AccountInfoResponse {
    /// Wrap an account snapshot
    pub fn new(data: Record) -> Self {
        Self {
            status: ResponseStatus::Success,
            data,
        }
    }
}

/// The date range exactly as the caller sent it
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DateRangeEcho {
    /// Original `from_date`
    pub from: String,
    /// Original `to_date`
    pub to: String,
}

/// Deal history response
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    /// Always `success`
    pub status: ResponseStatus,
    /// Deals, with `time` rendered as ISO-8601
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Record>,
    /// Number of deals
    pub count: usize,
    /// Requested date range
    pub date_range: DateRangeEcho,
}

impl HistoryResponse {
    /// Wrap a list of deals
    pub fn new(data: Vec<Record>, from: String, to: String) -> Self {
        Self {
            status: ResponseStatus::Success,
            count: data.len(),
            data,
            date_range: DateRangeEcho { from, to },
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `healthy`
    pub status: ResponseStatus,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Local server time, ISO-8601
    pub timestamp: String,
}

impl IntoResponse for AccountInfoResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl IntoResponse for HistoryResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
