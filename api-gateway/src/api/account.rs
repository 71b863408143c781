//! Account API handlers
//!
//! Handles `POST /api/v1/account-info`: log in with the caller's credentials
//! and return the account snapshot.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;

use common::model::request::parse_body;
use common::{AccountInfoRequest, Error};

use crate::api::response::AccountInfoResponse;
use crate::error::ApiError;
use crate::AppState;

/// Get current account information
#[utoipa::path(
    post,
    path = "/api/v1/account-info",
    request_body = AccountInfoRequest,
    responses(
        (status = 200, description = "Account snapshot retrieved", body = AccountInfoResponse),
        (status = 400, description = "Missing or invalid request body", body = ErrorResponse),
        (status = 500, description = "Terminal login or account fetch failed", body = ErrorResponse)
    ),
    tag = "account"
)]
pub async fn get_account_info(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<AccountInfoResponse, ApiError> {
    let credentials = AccountInfoRequest::from_value(parse_body(&body)?)?.into_credentials();

    let snapshot = state
        .sessions
        .with_session(&credentials, |terminal| {
            Box::pin(async move {
                match terminal.account_info().await {
                    Some(snapshot) => Ok(snapshot),
                    None => Err(Error::Fetch {
                        message: "Failed to get account info".to_string(),
                        native: terminal.last_error().await,
                    }),
                }
            })
        })
        .await?;

    Ok(AccountInfoResponse::new(snapshot))
}
