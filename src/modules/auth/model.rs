use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use bookstore_models::Role;

use crate::validator::not_blank;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username must be between 3 and 50 characters"
    ))]
    #[schema(example = "reader42")]
    pub username: String,
    #[validate(email(message = "Email should be valid"))]
    #[schema(example = "reader42@example.com")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(custom(function = "not_blank", message = "Address is required"))]
    pub address: String,
    pub age: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(custom(function = "not_blank", message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body returned by every auth endpoint. `token` is absent after registration.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub token: Option<String>,
    pub username: String,
    pub role: Role,
}
