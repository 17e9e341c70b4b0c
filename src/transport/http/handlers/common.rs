//! Failure responses shared by all handlers.
//!
//! Every failure answers with the same envelope; only the status code and the
//! human-readable message differ. Underlying errors are logged, never sent
//! to the client.

use crate::infra::car_info::CarInfoError;
use crate::storage::{StorageError, StorageErrorKind};
use crate::transport::http::types::ApiResponse;
use crate::transport::http::validation::FieldError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub const DECODE_FAILED: &str = "failed to decode request";

pub fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(ApiResponse::error(message))).into_response()
}

pub fn decode_failure(op: &'static str, err: JsonRejection) -> Response {
    tracing::error!(op, error = %err, "failed to decode request");
    failure(StatusCode::BAD_REQUEST, DECODE_FAILED)
}

pub fn validation_failure(op: &'static str, err: FieldError) -> Response {
    tracing::warn!(op, field = err.field, "invalid request");
    failure(StatusCode::BAD_REQUEST, &err.message)
}

pub fn storage_failure(op: &'static str, err: StorageError, message: &str) -> Response {
    tracing::error!(op, storage_op = err.op(), error = %err, kind = ?err.kind(), "{}", message);
    failure(storage_status(err.kind()), message)
}

pub fn car_info_failure(op: &'static str, err: CarInfoError, message: &str) -> Response {
    tracing::error!(op, error = %err, "{}", message);
    failure(car_info_status(&err), message)
}

pub fn storage_status(kind: StorageErrorKind) -> StatusCode {
    match kind {
        StorageErrorKind::NotFound => StatusCode::NOT_FOUND,
        StorageErrorKind::Conflict => StatusCode::CONFLICT,
        StorageErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        StorageErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn car_info_status(err: &CarInfoError) -> StatusCode {
    match err {
        CarInfoError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        CarInfoError::BadRequest(_)
        | CarInfoError::Connection(_)
        | CarInfoError::ServerFatal(_)
        | CarInfoError::BadResponse(_) => StatusCode::BAD_GATEWAY,
    }
}
