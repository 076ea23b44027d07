use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, Method, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use bookstore_core::AppError;
use bookstore_models::Principal;

use crate::modules::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Path prefixes that skip token processing entirely.
pub const PUBLIC_PATH_PREFIXES: &[&str] = &[
    "/api/auth/",
    "/health",
    "/error",
    "/metrics",
    "/favicon.ico",
    "/swagger-ui",
    "/api-docs",
    "/scalar",
];

/// Whether a request bypasses authentication: CORS preflights and the
/// paths in [`PUBLIC_PATH_PREFIXES`].
pub fn is_public_path(method: &Method, path: &str) -> bool {
    *method == Method::OPTIONS
        || PUBLIC_PATH_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().trim().to_string())
        .filter(|token| !token.is_empty())
}

/// The caller's identity for one request. Empty when no valid token was
/// presented.
#[derive(Debug, Clone, Default)]
pub struct IdentityContext(pub Option<Principal>);

impl IdentityContext {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

/// Extractor for handlers that need an authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityContext>()
            .and_then(|ctx| ctx.principal().cloned())
            .map(AuthUser)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

/// Attaches an [`IdentityContext`] to every request.
///
/// A missing header, an invalid token or an unknown subject all leave the
/// context empty; rejecting the request is left to the route policy.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let identity = if is_public_path(req.method(), req.uri().path()) {
        IdentityContext::anonymous()
    } else {
        match bearer_token(req.headers()) {
            None => IdentityContext::anonymous(),
            Some(token) => {
                match AuthService::resolve_principal(state.users.as_ref(), &state.tokens, &token)
                    .await
                {
                    Ok(principal) => IdentityContext(Some(principal)),
                    Err(err @ (AuthError::Store(_) | AuthError::Internal(_))) => {
                        tracing::error!(error = ?err, "Failed to resolve token subject");
                        IdentityContext::anonymous()
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "Ignoring unusable bearer token");
                        IdentityContext::anonymous()
                    }
                }
            }
        }
    };

    req.extensions_mut().insert(identity);
    next.run(req).await
}
