//! # Bookstore Models
//!
//! Domain types shared by the bookstore API, its stores and the CLI.
//!
//! - [`ids`]: typed row identifiers
//! - [`users`]: roles, the per-request [`Principal`] and stored user rows
//! - [`books`]: stock rows as seen by order placement
//! - [`orders`]: orders, their lines and the status set

pub mod ids;
pub mod orders;
pub mod users;

mod books;
mod text_enum;

pub use books::StockItem;
pub use ids::{BookId, OrderId, UserId};
pub use orders::{NewOrder, Order, OrderLine, OrderOwner, OrderStatus};
pub use text_enum::UnknownVariant;
pub use users::{NewUser, Principal, Role, UserRecord};
