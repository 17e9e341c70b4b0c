pub mod middleware;
pub mod router;
pub mod types;
pub mod validation;
pub mod handlers {
    pub mod car;
    pub mod common;
    pub mod health;
    pub mod owner;
}

pub use middleware::apply_middleware;
pub use router::{create_router, ApiDoc};
pub use types::AppState;
