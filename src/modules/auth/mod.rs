pub mod controller;
pub mod error;
pub mod model;
pub mod router;
pub mod service;

pub use error::AuthError;
pub use model::*;
pub use router::init_auth_router;
pub use service::AuthService;
