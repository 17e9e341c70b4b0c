//! `/car/*` handlers.
//!
//! Each handler decodes the body, validates it, runs the storage operation(s)
//! and renders the envelope.

use crate::domain::{Patch, SearchRequest};
use crate::transport::http::handlers::common::{
    car_info_failure, decode_failure, storage_failure, validation_failure,
};
use crate::transport::http::types::{
    ApiResponse, AppState, DeleteCarRequest, SaveCarRequest, SaveCarResponse, SearchCarsResponse,
    UpdateCarRequest,
};
use crate::transport::http::validation::Validate;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Looks the registration numbers up in the car-info service and stores every
/// car it returns.
///
/// Cars are stored one at a time: when one fails, the ones before it stay stored.
#[utoipa::path(
    post,
    path = "/car/save",
    tag = "Car",
    request_body = SaveCarRequest,
    responses(
        (status = 200, description = "Cars saved", body = SaveCarResponse),
        (status = 400, description = "Malformed or invalid request", body = ApiResponse),
        (status = 502, description = "Car-info service failed", body = ApiResponse),
        (status = 504, description = "Car-info service timed out", body = ApiResponse),
        (status = 500, description = "Storage failure", body = ApiResponse)
    )
)]
pub async fn save_car_handler(
    State(state): State<AppState>,
    request: Result<Json<SaveCarRequest>, JsonRejection>,
) -> impl IntoResponse {
    const OP: &str = "handlers.car.save";

    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return decode_failure(OP, e),
    };
    tracing::info!(op = OP, request = ?request, "request body decoded");

    if let Err(e) = request.validate() {
        return validation_failure(OP, e);
    }

    let cars = match state.car_info.resolve(&request.reg_nums).await {
        Ok(cars) => cars,
        Err(e) => return car_info_failure(OP, e, "failed to find car"),
    };

    let mut cars_ids = Vec::with_capacity(cars.len());
    for car in &cars {
        match state.storage.save_car(car).await {
            Ok(car_id) => {
                tracing::info!(op = OP, car_id, reg_num = %car.reg_num, "car saved");
                cars_ids.push(car_id);
            }
            Err(e) => return storage_failure(OP, e, "failed to save car"),
        }
    }

    (
        StatusCode::OK,
        Json(SaveCarResponse {
            response: ApiResponse::ok(),
            cars_ids,
        }),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/car/search",
    tag = "Car",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Matching cars", body = SearchCarsResponse),
        (status = 400, description = "Malformed or invalid request", body = ApiResponse),
        (status = 500, description = "Storage failure", body = ApiResponse)
    )
)]
pub async fn search_cars_handler(
    State(state): State<AppState>,
    request: Result<Json<SearchRequest>, JsonRejection>,
) -> impl IntoResponse {
    const OP: &str = "handlers.car.search";

    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return decode_failure(OP, e),
    };
    tracing::info!(op = OP, request = ?request, "request body decoded");

    if let Err(e) = request.validate() {
        return validation_failure(OP, e);
    }

    match state.storage.search_cars(&request).await {
        Ok(cars) => (
            StatusCode::OK,
            Json(SearchCarsResponse {
                response: ApiResponse::ok(),
                cars,
            }),
        )
            .into_response(),
        Err(e) => storage_failure(OP, e, "failed to get cars by search request"),
    }
}

#[utoipa::path(
    delete,
    path = "/car/delete",
    tag = "Car",
    request_body = DeleteCarRequest,
    responses(
        (status = 200, description = "Car deleted", body = ApiResponse),
        (status = 400, description = "Malformed or invalid request", body = ApiResponse),
        (status = 404, description = "No such car", body = ApiResponse),
        (status = 500, description = "Storage failure", body = ApiResponse)
    )
)]
pub async fn delete_car_handler(
    State(state): State<AppState>,
    request: Result<Json<DeleteCarRequest>, JsonRejection>,
) -> impl IntoResponse {
    const OP: &str = "handlers.car.delete";

    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return decode_failure(OP, e),
    };
    tracing::info!(op = OP, request = ?request, "request body decoded");

    if let Err(e) = request.validate() {
        return validation_failure(OP, e);
    }

    match state.storage.delete_car(request.car_id).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok())).into_response(),
        Err(e) => storage_failure(OP, e, "failed to delete car"),
    }
}

/// Applies every field present in the body, one storage call per field, in
/// the order regNum, mark, model, year, owner. The first failure stops the
/// update; fields applied before it are kept.
#[utoipa::path(
    put,
    path = "/car/update",
    tag = "Car",
    request_body = UpdateCarRequest,
    responses(
        (status = 200, description = "Car updated", body = ApiResponse),
        (status = 400, description = "Malformed or invalid request", body = ApiResponse),
        (status = 404, description = "No such car", body = ApiResponse),
        (status = 500, description = "Storage failure", body = ApiResponse)
    )
)]
pub async fn update_car_handler(
    State(state): State<AppState>,
    request: Result<Json<UpdateCarRequest>, JsonRejection>,
) -> impl IntoResponse {
    const OP: &str = "handlers.car.update";

    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return decode_failure(OP, e),
    };
    tracing::info!(op = OP, request = ?request, "request body decoded");

    if let Err(e) = request.validate() {
        return validation_failure(OP, e);
    }

    let storage = &state.storage;
    let car_id = request.car_id;

    if let Patch::Present(reg_num) = &request.reg_num {
        if let Err(e) = storage.update_reg_num(car_id, reg_num).await {
            return storage_failure(OP, e, "failed to update regNum");
        }
    }

    if let Patch::Present(mark) = &request.mark {
        if let Err(e) = storage.update_mark(car_id, mark).await {
            return storage_failure(OP, e, "failed to update mark");
        }
    }

    if let Patch::Present(model) = &request.model {
        if let Err(e) = storage.update_model(car_id, model).await {
            return storage_failure(OP, e, "failed to update model");
        }
    }

    if let Patch::Present(year) = request.year {
        if let Err(e) = storage.update_year(car_id, year).await {
            return storage_failure(OP, e, "failed to update year");
        }
    }

    if let Patch::Present(owner) = &request.owner {
        if let Err(e) = storage.update_owner(car_id, owner).await {
            return storage_failure(OP, e, "failed to update owner");
        }
    }

    (StatusCode::OK, Json(ApiResponse::ok())).into_response()
}
