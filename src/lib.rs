pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use domain::{Car, CarId, Owner, OwnerId, Patch, SearchRequest, StoredCar};
pub use infra::car_info::{CarInfoError, CarInfoResolver, HttpCarInfoClient};
pub use infra::config::Config;
pub use storage::{CarStore, PostgresStorage, StorageError, StorageErrorKind};
