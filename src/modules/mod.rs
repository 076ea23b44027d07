use serde::Serialize;
use utoipa::ToSchema;

pub mod auth;
pub mod orders;

/// Error body shared by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}
