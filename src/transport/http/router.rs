use crate::domain::{Car, Owner, SearchRequest, StoredCar};
use crate::transport::http::handlers::{car, health, owner};
use crate::transport::http::types::{
    ApiResponse, AppState, DeleteCarRequest, DeleteOwnerRequest, SaveCarRequest, SaveCarResponse,
    SaveOwnerResponse, SearchCarsResponse, Status, UpdateCarRequest, UpdateOwnerRequest,
};
use axum::routing::{delete, get, post, put};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Cars Catalog API", version = "1.0", description = "CRUD catalog of cars and their owners"),
    paths(
        health::healthcheck_handler,
        car::save_car_handler,
        car::search_cars_handler,
        car::delete_car_handler,
        car::update_car_handler,
        owner::save_owner_handler,
        owner::delete_owner_handler,
        owner::update_owner_handler
    ),
    components(schemas(
        ApiResponse,
        Status,
        Car,
        Owner,
        StoredCar,
        SearchRequest,
        SaveCarRequest,
        SaveCarResponse,
        SearchCarsResponse,
        DeleteCarRequest,
        UpdateCarRequest,
        SaveOwnerResponse,
        DeleteOwnerRequest,
        UpdateOwnerRequest
    )),
    tags(
        (name = "Car", description = "Cars and their owner links"),
        (name = "Owner", description = "Owners")
    )
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/car/save", post(car::save_car_handler))
        .route("/car/search", get(car::search_cars_handler))
        .route("/car/delete", delete(car::delete_car_handler))
        .route("/car/update", put(car::update_car_handler))
        .route("/owner/save", post(owner::save_owner_handler))
        .route("/owner/delete", delete(owner::delete_owner_handler))
        .route("/owner/update", put(owner::update_owner_handler))
        .with_state(app_state)
}
