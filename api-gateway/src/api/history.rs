//! History API handlers
//!
//! Handles `POST /api/v1/history`: return the deals executed between
//! `from_date` and `to_date`, both days included.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use tracing::debug;

use common::model::request::parse_body;
use common::{Error, HistoryRequest, Record};

use crate::api::response::HistoryResponse;
use crate::error::ApiError;
use crate::AppState;

/// Get trading history within a date range
///
/// `to_date` is inclusive: the terminal is queried up to the start of the
/// following day. An empty list is a successful answer; a missing result
/// object from the terminal is reported as 404.
#[utoipa::path(
    post,
    path = "/api/v1/history",
    request_body = HistoryRequest,
    responses(
        (status = 200, description = "Deals retrieved", body = HistoryResponse),
        (status = 400, description = "Missing or invalid request body", body = ErrorResponse),
        (status = 404, description = "Terminal returned no deal result", body = ErrorResponse),
        (status = 500, description = "Terminal login failed", body = ErrorResponse)
    ),
    tag = "history"
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<HistoryResponse, ApiError> {
    let query = HistoryRequest::from_value(parse_body(&body)?)?;
    let (from, to) = query.range.query_bounds();
    debug!("Deal history window [{}, {})", from, to);

    let deals = state
        .sessions
        .with_session(&query.credentials, move |terminal| {
            Box::pin(async move {
                let deals = match terminal.history_deals_get(from, to).await {
                    Some(deals) => deals,
                    None => {
                        let native = terminal.last_error().await;
                        return Err(Error::NotFound {
                            message: format!("No deals found or MT5 error: {native}"),
                            native,
                        });
                    }
                };

                deals
                    .into_iter()
                    .map(Record::into_deal)
                    .collect::<common::Result<Vec<_>>>()
            })
        })
        .await?;

    Ok(HistoryResponse::new(deals, query.from_date, query.to_date))
}
