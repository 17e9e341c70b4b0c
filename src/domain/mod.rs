//! Domain types for the cars catalog.

pub mod car;
pub mod patch;

pub use car::{Car, CarId, Owner, OwnerId, SearchRequest, StoredCar};
pub use patch::Patch;
