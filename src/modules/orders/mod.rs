pub mod controller;
pub mod error;
pub mod model;
pub mod router;
pub mod service;

pub use error::OrderError;
pub use model::*;
pub use router::init_orders_router;
pub use service::OrderService;
