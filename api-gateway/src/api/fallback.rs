//! Fallback handlers for unmatched requests

use crate::error::ApiError;

/// Any path no route matches
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// A known path hit with the wrong method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
