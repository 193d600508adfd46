//! Authorization gate middleware for protected routes.
//!
//! Each protected route is wired with an explicit required permission.
//! The gate extracts the Bearer token from the Authorization header,
//! validates the JWT via the JWKS-backed validator, checks the route's
//! permission against the verified claims, and injects the claims into
//! request extensions. Any failure short-circuits before the handler runs.

use crate::auth::{check_permission, AuthError, Claims, JwtValidator};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// The composed authorization entry point.
///
/// Holds the shared validator (and through it, the key cache). Cloning is
/// cheap; each protected route carries a clone bound to its permission.
#[derive(Clone)]
pub struct AuthGate {
    /// JWT validator with JWKS client.
    pub jwt_validator: Arc<JwtValidator>,
}

impl AuthGate {
    pub fn new(jwt_validator: Arc<JwtValidator>) -> Self {
        Self { jwt_validator }
    }

    /// Bind this gate to a route's required permission.
    ///
    /// The permission is passed explicitly at each wiring call site; there
    /// is no ambient registry of route permissions.
    pub fn require(&self, permission: &'static str) -> RoutePermission {
        RoutePermission {
            gate: self.clone(),
            permission,
        }
    }

    /// Validate the request headers and enforce the required permission.
    ///
    /// This is the sole entry point the rest of the system uses per
    /// protected operation: it yields the verified claims on success, or
    /// the first classified failure.
    pub async fn enforce(
        &self,
        headers: &HeaderMap,
        permission: &str,
    ) -> Result<Claims, AuthError> {
        let token = extract_bearer_token(headers)?;

        let claims = self.jwt_validator.validate(token).await?;

        check_permission(&claims, permission)?;

        Ok(claims)
    }
}

/// Per-route middleware state: the gate plus the route's permission.
#[derive(Clone)]
pub struct RoutePermission {
    gate: AuthGate,
    permission: &'static str,
}

/// Extract the Bearer token from the Authorization header.
///
/// Header name lookup is case-insensitive; the `Bearer ` scheme prefix is
/// case-sensitive.
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "casting.middleware.auth", "Missing Authorization header");
            AuthError::InvalidHeader("Authorization header is expected".to_string())
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "casting.middleware.auth", "Invalid Authorization header format");
        AuthError::InvalidHeader("Authorization header must start with Bearer".to_string())
    })
}

/// Authorization middleware applied as a route layer on protected routes.
///
/// # Response
///
/// - Continues to the handler with `Claims` in extensions on success
/// - Returns the classified authorization error otherwise; the handler
///   never runs on failure
#[instrument(skip_all, name = "casting.middleware.auth", fields(permission = %state.permission))]
pub async fn require_permission(
    State(state): State<RoutePermission>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AuthError> {
    let claims = state.gate.enforce(req.headers(), state.permission).await?;

    // Store verified claims in request extensions for downstream handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
