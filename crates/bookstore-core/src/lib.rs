//! # Bookstore Core
//!
//! Foundational types shared by every Bookstore crate:
//!
//! - [`errors`]: [`AppError`], an HTTP-status-carrying error that renders as JSON
//! - [`password`]: bcrypt password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use bookstore_core::{AppError, hash_password, verify_password};
//!
//! let hash = hash_password("s3cret!")?;
//! if !verify_password("s3cret!", &hash)? {
//!     return Err(AppError::unauthorized("Invalid username or password"));
//! }
//! ```

pub mod errors;
pub mod password;

pub use errors::AppError;
pub use password::{hash_password, verify_password};
