//! Car / owner records as they travel between the HTTP layer, the storage
//! layer and the external car-info service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Surrogate key of a row in `cars`.
pub type CarId = i32;

/// Surrogate key of a row in `owners`.
pub type OwnerId = i32;

/// An owner is identified by the full `(name, surname, patronymic)` tuple.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Default, ToSchema)]
pub struct Owner {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub patronymic: String,
}

impl Owner {
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        patronymic: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            patronymic: patronymic.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    #[schema(example = "X123XX150")]
    pub reg_num: String,
    #[schema(example = "Lada")]
    pub mark: String,
    #[schema(example = "Vesta")]
    pub model: String,
    #[schema(example = 2002)]
    pub year: i32,
    pub owner: Owner,
}

/// A car as read back from the store, with the keys needed to update or
/// delete it later.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredCar {
    pub car_id: CarId,
    pub owner_id: OwnerId,
    #[serde(flatten)]
    pub car: Car,
}

/// Free-text, paginated search over cars and their owners.
///
/// `query` is matched as a substring of the registration number, mark,
/// model and the owner's name parts. Pages are 1-based.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub page_num: i64,
    #[serde(default)]
    pub page_size: i64,
}

impl SearchRequest {
    /// Row offset of the first car on the requested page.
    ///
    /// Pages below 1 are treated as the first page.
    pub fn offset(&self) -> i64 {
        self.page_size
            .max(0)
            .saturating_mul(self.page_num.max(1).saturating_sub(1))
    }
}
