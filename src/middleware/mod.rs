//! Request identity and access control.
//!
//! Handling is split in two phases:
//!
//! 1. [`auth::authenticate`] runs on every request. It turns a valid
//!    `Authorization: Bearer <token>` header into an [`auth::IdentityContext`]
//!    holding the caller's [`Principal`](bookstore_models::Principal), or an
//!    empty context otherwise. It never rejects a request.
//! 2. [`role::enforce_route_policy`] looks up the matched route in
//!    [`role::ROUTE_TABLE`] and rejects with 401 or 403 when the identity
//!    does not satisfy the route's requirement.
//!
//! Handlers read the principal with the [`auth::AuthUser`] extractor.

pub mod auth;
pub mod role;
