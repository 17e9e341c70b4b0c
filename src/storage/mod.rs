//! Storage layer: the `CarStore` contract and its PostgreSQL implementation.

pub mod error;
pub mod postgres;

pub use error::{StorageError, StorageErrorKind};
pub use postgres::PostgresStorage;

use crate::domain::{Car, CarId, Owner, OwnerId, SearchRequest, StoredCar};
use async_trait::async_trait;

/// Every operation the HTTP layer may perform against the catalog.
///
/// Implementations own the database handle; handlers only ever talk to this
/// trait.
#[async_trait]
pub trait CarStore: Send + Sync {
    /// Cheap round-trip used by the health check.
    async fn ping(&self) -> Result<(), StorageError>;

    /// Inserts an owner unconditionally and returns its id.
    async fn save_owner(&self, owner: &Owner) -> Result<OwnerId, StorageError>;

    /// Find-or-create by exact `(name, surname, patronymic)` match.
    ///
    /// When several owners share the identity tuple the lowest id wins.
    async fn get_owner_id(&self, owner: &Owner) -> Result<OwnerId, StorageError>;

    /// Inserts the car, resolves its owner and links the two.
    async fn save_car(&self, car: &Car) -> Result<CarId, StorageError>;

    /// Paginated substring search over cars that have an owner.
    async fn search_cars(&self, request: &SearchRequest) -> Result<Vec<StoredCar>, StorageError>;

    /// Removes the car and its owner links. The owners themselves are kept.
    async fn delete_car(&self, car_id: CarId) -> Result<(), StorageError>;

    /// Removes the owner and its car links. The cars themselves are kept.
    async fn delete_owner(&self, owner_id: OwnerId) -> Result<(), StorageError>;

    async fn update_reg_num(&self, car_id: CarId, reg_num: &str) -> Result<(), StorageError>;
    async fn update_mark(&self, car_id: CarId, mark: &str) -> Result<(), StorageError>;
    async fn update_model(&self, car_id: CarId, model: &str) -> Result<(), StorageError>;
    async fn update_year(&self, car_id: CarId, year: i32) -> Result<(), StorageError>;

    /// Replaces every owner link of the car with a link to `owner`
    /// (found or created by identity).
    async fn update_owner(&self, car_id: CarId, owner: &Owner) -> Result<(), StorageError>;

    async fn update_owner_name(&self, owner_id: OwnerId, name: &str) -> Result<(), StorageError>;
    async fn update_owner_surname(
        &self,
        owner_id: OwnerId,
        surname: &str,
    ) -> Result<(), StorageError>;
    async fn update_owner_patronymic(
        &self,
        owner_id: OwnerId,
        patronymic: &str,
    ) -> Result<(), StorageError>;
}
