use chrono::Utc;
use tracing::{info, instrument, warn};

use bookstore_auth::TokenService;
use bookstore_core::{hash_password, verify_password};
use bookstore_models::{NewUser, Principal, Role, UserRecord};

use crate::metrics::{
    track_token_issued, track_user_login_failure, track_user_login_success, track_user_registered,
};
use crate::store::{StoreError, UserDirectory};

use super::error::AuthError;
use super::model::{LoginRequest, RegisterRequest};

pub struct AuthService;

impl AuthService {
    /// Creates a customer account. No token is issued; the caller logs in next.
    #[instrument(skip_all, fields(username = %dto.username))]
    pub async fn register(
        users: &dyn UserDirectory,
        dto: RegisterRequest,
    ) -> Result<UserRecord, AuthError> {
        if users.username_exists(&dto.username).await? {
            return Err(AuthError::UsernameTaken);
        }
        if users.email_exists(&dto.email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&dto.password)?;

        let user = users
            .create_user(NewUser {
                username: dto.username,
                email: dto.email,
                password_hash,
                address: dto.address.trim().to_string(),
                age: dto.age,
                customer_id: format!("CUST{}", Utc::now().timestamp_millis()),
                role: Role::Customer,
            })
            .await
            .map_err(|err| match err {
                StoreError::Duplicate("email") => AuthError::EmailTaken,
                StoreError::Duplicate(_) => AuthError::UsernameTaken,
                other => AuthError::Store(other),
            })?;

        track_user_registered();
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks credentials and issues a fresh token.
    #[instrument(skip_all, fields(username = %dto.username))]
    pub async fn login(
        users: &dyn UserDirectory,
        tokens: &TokenService,
        dto: LoginRequest,
    ) -> Result<(UserRecord, String), AuthError> {
        let Some(user) = users.find_by_username(&dto.username).await? else {
            track_user_login_failure("unknown_user");
            warn!("Login failed");
            return Err(AuthError::BadCredentials);
        };

        if !verify_password(&dto.password, &user.password_hash)? {
            track_user_login_failure("bad_password");
            warn!("Login failed");
            return Err(AuthError::BadCredentials);
        }

        let token = tokens.issue(&user.username)?;
        track_token_issued();
        track_user_login_success(user.role.as_str());
        info!(user_id = %user.id, "User logged in");

        Ok((user, token))
    }

    /// Validates a bearer token and resolves its subject to the user's
    /// current identity and role.
    pub async fn resolve_principal(
        users: &dyn UserDirectory,
        tokens: &TokenService,
        token: &str,
    ) -> Result<Principal, AuthError> {
        let claims = tokens.validate(token)?;
        let user = users
            .find_by_username(&claims.sub)
            .await?
            .ok_or(AuthError::UnknownSubject)?;
        Ok(user.principal())
    }
}
