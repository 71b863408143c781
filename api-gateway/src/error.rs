//! Error handling for the API gateway
//!
//! Every handler returns `Result<_, ApiError>`. This is the single place where
//! failures become HTTP statuses and the `{status: "error", ...}` envelope.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::response::ResponseStatus;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `error`
    pub status: ResponseStatus,
    /// Human-readable error message
    pub message: String,
    /// Terminal error detail as `[code, "description"]`
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Common(#[from] common::Error),

    #[error("Endpoint not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error")]
    Panic,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Common(e) => match e {
                // Client errors (4xx)
                common::Error::MissingBody | common::Error::Validation(_) => {
                    StatusCode::BAD_REQUEST
                }
                common::Error::NotFound { .. } => StatusCode::NOT_FOUND,

                // Server errors (5xx)
                common::Error::Connection(_)
                | common::Error::Fetch { .. }
                | common::Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Panic => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Envelope body for this error
    pub fn body(&self) -> ErrorResponse {
        let details = match self {
            ApiError::Common(e) => e.native().and_then(|n| serde_json::to_value(n).ok()),
            _ => None,
        };

        ErrorResponse {
            status: ResponseStatus::Error,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("API error: {}", self);
        } else {
            tracing::warn!("API error: {}", self);
        }

        (status, Json(self.body())).into_response()
    }
}

/// Response for a panic that escaped a handler
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);

    ApiError::Panic.into_response()
}
