//! Per-route role requirements.
//!
//! [`authorize`] is a pure decision over a route's requirement and the
//! caller's identity; [`enforce_route_policy`] applies it to requests using
//! the matched route template.

use axum::{
    extract::{MatchedPath, Request},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use bookstore_core::AppError;
use bookstore_models::{Principal, Role};

use crate::middleware::auth::IdentityContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRequirement {
    Public,
    Authenticated,
    Role(Role),
}

/// Requirements keyed by method and route template. Unlisted routes are public.
pub const ROUTE_TABLE: &[(&str, &str, RouteRequirement)] = &[
    ("POST", "/api/orders", RouteRequirement::Authenticated),
    ("GET", "/api/orders/user", RouteRequirement::Authenticated),
    ("GET", "/api/orders/{id}", RouteRequirement::Authenticated),
    ("POST", "/api/orders/{id}/cancel", RouteRequirement::Authenticated),
    ("GET", "/api/orders/admin", RouteRequirement::Role(Role::Admin)),
    ("PUT", "/api/orders/{id}/status", RouteRequirement::Role(Role::Admin)),
];

pub fn requirement_for(method: &Method, route: &str) -> RouteRequirement {
    ROUTE_TABLE
        .iter()
        .find(|(m, path, _)| *m == method.as_str() && *path == route)
        .map(|(_, _, requirement)| *requirement)
        .unwrap_or(RouteRequirement::Public)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Access denied. Required role: {0}")]
    Forbidden(Role),
}

impl Denial {
    pub fn status(&self) -> StatusCode {
        match self {
            Denial::Unauthenticated => StatusCode::UNAUTHORIZED,
            Denial::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        AppError::new(self.status(), self).into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(Denial),
}

pub fn authorize(requirement: RouteRequirement, identity: Option<&Principal>) -> AccessDecision {
    match (requirement, identity) {
        (RouteRequirement::Public, _) => AccessDecision::Allow,
        (_, None) => AccessDecision::Deny(Denial::Unauthenticated),
        (RouteRequirement::Authenticated, Some(_)) => AccessDecision::Allow,
        (RouteRequirement::Role(required), Some(principal)) if principal.role == required => {
            AccessDecision::Allow
        }
        (RouteRequirement::Role(required), Some(_)) => {
            AccessDecision::Deny(Denial::Forbidden(required))
        }
    }
}

/// Rejects requests whose identity does not meet the matched route's
/// requirement. Must run after [`authenticate`](crate::middleware::auth::authenticate).
pub async fn enforce_route_policy(req: Request, next: Next) -> Response {
    let decision = {
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map(|path| path.as_str())
            .unwrap_or_else(|| req.uri().path());
        let identity = req
            .extensions()
            .get::<IdentityContext>()
            .and_then(IdentityContext::principal);
        authorize(requirement_for(req.method(), route), identity)
    };

    match decision {
        AccessDecision::Allow => next.run(req).await,
        AccessDecision::Deny(denial) => {
            tracing::debug!(method = %req.method(), path = %req.uri().path(), %denial, "Request denied");
            denial.into_response()
        }
    }
}
