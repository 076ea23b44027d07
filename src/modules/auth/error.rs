use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use bookstore_auth::TokenError;
use bookstore_core::AppError;

use crate::store::StoreError;

/// Failures of registration, login and token resolution.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    BadCredentials,
    #[error("Missing or malformed Authorization header")]
    MissingToken,
    #[error("Invalid token: {0}")]
    Token(#[from] TokenError),
    #[error("Username is already taken")]
    UsernameTaken,
    #[error("Email is already in use")]
    EmailTaken,
    #[error("User not found")]
    UnknownSubject,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::BadCredentials | AuthError::UsernameTaken | AuthError::EmailTaken => {
                StatusCode::BAD_REQUEST
            }
            AuthError::MissingToken | AuthError::Token(_) | AuthError::UnknownSubject => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Store(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_app_error(self) -> AppError {
        AppError::new(self.status(), self)
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.error)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.into_app_error().into_response()
    }
}
