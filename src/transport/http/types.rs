use crate::domain::{CarId, Owner, OwnerId, Patch, StoredCar};
use crate::infra::car_info::CarInfoResolver;
use crate::storage::CarStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Shared handler state. Both collaborators are safe for concurrent use.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn CarStore>,
    pub car_info: Arc<dyn CarInfoResolver>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Error")]
    Error,
}

/// Envelope shared by every response. Endpoint payloads are flattened next to it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ApiResponse {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            status: Status::Ok,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            error: Some(message.into()),
        }
    }
}

// --- /car/* ---

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveCarRequest {
    /// Registration numbers to look up in the car-info service and store.
    #[serde(default)]
    #[schema(example = json!(["X123XX150"]))]
    pub reg_nums: Vec<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct SaveCarResponse {
    #[serde(flatten)]
    pub response: ApiResponse,
    pub cars_ids: Vec<CarId>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct SearchCarsResponse {
    #[serde(flatten)]
    pub response: ApiResponse,
    pub cars: Vec<StoredCar>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCarRequest {
    #[serde(default)]
    pub car_id: CarId,
}

/// Sparse car update; only the fields present in the body are changed.
#[derive(Serialize, Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCarRequest {
    #[serde(default)]
    pub car_id: CarId,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub reg_num: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub mark: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub model: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub year: Patch<i32>,
    #[serde(default)]
    #[schema(value_type = Option<Owner>)]
    pub owner: Patch<Owner>,
}

// --- /owner/* ---

#[derive(Serialize, Debug, ToSchema)]
pub struct SaveOwnerResponse {
    #[serde(flatten)]
    pub response: ApiResponse,
    pub owner_id: OwnerId,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOwnerRequest {
    #[serde(default)]
    pub owner_id: OwnerId,
}

/// Sparse owner update; only the fields present in the body are changed.
#[derive(Serialize, Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOwnerRequest {
    #[serde(default)]
    pub owner_id: OwnerId,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub surname: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub patronymic: Patch<String>,
}
