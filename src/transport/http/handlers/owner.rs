//! `/owner/*` handlers.

use crate::domain::{Owner, Patch};
use crate::transport::http::handlers::common::{decode_failure, storage_failure, validation_failure};
use crate::transport::http::types::{
    ApiResponse, AppState, DeleteOwnerRequest, SaveOwnerResponse, UpdateOwnerRequest,
};
use crate::transport::http::validation::Validate;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Stores a new owner. No duplicate check: saving the same person twice
/// yields two rows.
#[utoipa::path(
    post,
    path = "/owner/save",
    tag = "Owner",
    request_body = Owner,
    responses(
        (status = 200, description = "Owner saved", body = SaveOwnerResponse),
        (status = 400, description = "Malformed or invalid request", body = ApiResponse),
        (status = 500, description = "Storage failure", body = ApiResponse)
    )
)]
pub async fn save_owner_handler(
    State(state): State<AppState>,
    request: Result<Json<Owner>, JsonRejection>,
) -> impl IntoResponse {
    const OP: &str = "handlers.owner.save";

    let Json(owner) = match request {
        Ok(v) => v,
        Err(e) => return decode_failure(OP, e),
    };
    tracing::info!(op = OP, request = ?owner, "request body decoded");

    if let Err(e) = owner.validate() {
        return validation_failure(OP, e);
    }

    match state.storage.save_owner(&owner).await {
        Ok(owner_id) => (
            StatusCode::OK,
            Json(SaveOwnerResponse {
                response: ApiResponse::ok(),
                owner_id,
            }),
        )
            .into_response(),
        Err(e) => storage_failure(OP, e, "failed to save owner"),
    }
}

#[utoipa::path(
    delete,
    path = "/owner/delete",
    tag = "Owner",
    request_body = DeleteOwnerRequest,
    responses(
        (status = 200, description = "Owner deleted", body = ApiResponse),
        (status = 400, description = "Malformed or invalid request", body = ApiResponse),
        (status = 404, description = "No such owner", body = ApiResponse),
        (status = 500, description = "Storage failure", body = ApiResponse)
    )
)]
pub async fn delete_owner_handler(
    State(state): State<AppState>,
    request: Result<Json<DeleteOwnerRequest>, JsonRejection>,
) -> impl IntoResponse {
    const OP: &str = "handlers.owner.delete";

    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return decode_failure(OP, e),
    };
    tracing::info!(op = OP, request = ?request, "request body decoded");

    if let Err(e) = request.validate() {
        return validation_failure(OP, e);
    }

    match state.storage.delete_owner(request.owner_id).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok())).into_response(),
        Err(e) => storage_failure(OP, e, "failed to delete owner"),
    }
}

/// Applies name, surname and patronymic in that order, one storage call per
/// present field; stops at the first failure.
#[utoipa::path(
    put,
    path = "/owner/update",
    tag = "Owner",
    request_body = UpdateOwnerRequest,
    responses(
        (status = 200, description = "Owner updated", body = ApiResponse),
        (status = 400, description = "Malformed or invalid request", body = ApiResponse),
        (status = 404, description = "No such owner", body = ApiResponse),
        (status = 500, description = "Storage failure", body = ApiResponse)
    )
)]
pub async fn update_owner_handler(
    State(state): State<AppState>,
    request: Result<Json<UpdateOwnerRequest>, JsonRejection>,
) -> impl IntoResponse {
    const OP: &str = "handlers.owner.update";

    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return decode_failure(OP, e),
    };
    tracing::info!(op = OP, request = ?request, "request body decoded");

    if let Err(e) = request.validate() {
        return validation_failure(OP, e);
    }

    let storage = &state.storage;
    let owner_id = request.owner_id;

    if let Patch::Present(name) = &request.name {
        if let Err(e) = storage.update_owner_name(owner_id, name).await {
            return storage_failure(OP, e, "failed to update owner name");
        }
    }

    if let Patch::Present(surname) = &request.surname {
        if let Err(e) = storage.update_owner_surname(owner_id, surname).await {
            return storage_failure(OP, e, "failed to update owner surname");
        }
    }

    if let Patch::Present(patronymic) = &request.patronymic {
        if let Err(e) = storage.update_owner_patronymic(owner_id, patronymic).await {
            return storage_failure(OP, e, "failed to update owner patronymic");
        }
    }

    (StatusCode::OK, Json(ApiResponse::ok())).into_response()
}
