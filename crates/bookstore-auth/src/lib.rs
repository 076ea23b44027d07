//! # Bookstore Auth
//!
//! Stateless bearer tokens for the bookstore API.
//!
//! - [`claims`]: the signed claim set (`sub`, `iat`, `exp`)
//! - [`token`]: [`TokenService`], which issues and validates HS256 tokens
//!
//! Tokens carry only the username. The caller's role is resolved from the
//! user directory on every request, so a role change takes effect without
//! reissuing tokens.
//!
//! # Example
//!
//! ```ignore
//! use bookstore_auth::TokenService;
//! use bookstore_config::JwtConfig;
//!
//! let tokens = TokenService::new(&JwtConfig::from_env());
//! let token = tokens.issue("alice")?;
//! let claims = tokens.validate(&token)?;
//! assert_eq!(claims.sub, "alice");
//! ```

pub mod claims;
pub mod token;

pub use claims::Claims;
pub use token::{TokenError, TokenService};
