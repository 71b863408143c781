//! Router assembly
//!
//! Route table, fallbacks, OpenAPI document and the middleware stack.

use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    account::get_account_info,
    fallback::{method_not_allowed, route_not_found},
    health::health_check,
    history::get_history,
};
use crate::error::handle_panic;
use crate::AppState;

/// API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::account::get_account_info,
        crate::api::history::get_history,
        crate::api::health::health_check,
    ),
    components(
        schemas(
            // Requests
            common::AccountInfoRequest,
            common::HistoryRequest,

            // Responses
            crate::api::response::AccountInfoResponse,
            crate::api::response::HistoryResponse,
            crate::api::response::DateRangeEcho,
            crate::api::response::HealthResponse,
            crate::api::response::ResponseStatus,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "account", description = "Trading account snapshot"),
        (name = "history", description = "Executed deal history"),
        (name = "health", description = "Service health")
    ),
    info(
        title = "Finance MCP API",
        version = "1.0.0",
        description = "HTTP facade over a MetaTrader 5 terminal. Credentials are sent in plaintext request bodies; serve over TLS."
    )
)]
pub struct ApiDoc;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route(
            "/account-info",
            post(get_account_info).fallback(method_not_allowed),
        )
        .route("/history", post(get_history).fallback(method_not_allowed))
        .route("/health", get(health_check).fallback(method_not_allowed));

    let swagger_ui =
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(swagger_ui)
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(make_request_span)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(cors),
        )
        .with_state(state)
}

fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
