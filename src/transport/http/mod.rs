pub mod router;
pub mod types;
pub mod handlers {
    pub mod applications;
    pub mod common;
    pub mod health;
    pub mod licenses;
    pub mod wallet;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
