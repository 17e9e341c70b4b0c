//! Cross-cutting layers: request ids, request spans, panic recovery,
//! request timeout and CORS.

use crate::transport::http::types::ApiResponse;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::middleware::map_response;
use axum::{Json, Router};
use std::any::Any;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

/// Wraps `router` with the standard layer stack.
///
/// Outermost first: CORS, request-id assignment and propagation
/// (`x-request-id`), a tracing span per request carrying that id, panic
/// recovery, then the request timeout. Timed-out requests answer with the
/// error envelope like every other failure.
pub fn apply_middleware(router: Router, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new().allow_origin(AnyOrigin).allow_methods(AnyOrigin);

    router
        .layer(TimeoutLayer::new(request_timeout))
        .layer(map_response(timeout_envelope))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// `TimeoutLayer` answers 408 with an empty body; no handler produces 408 itself.
async fn timeout_envelope(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    tracing::warn!("request timed out");

    (
        StatusCode::REQUEST_TIMEOUT,
        Json(ApiResponse::error("request timed out")),
    )
        .into_response()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error("internal error")),
    )
        .into_response()
}
