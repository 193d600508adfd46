//! Authorization error taxonomy.
//!
//! Every failure in the authorization pipeline maps to one of a fixed set
//! of machine-readable codes so that clients can branch on `code` without
//! parsing prose. All variants are terminal for the request; the core
//! never retries or recovers internally.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authorization failure.
///
/// Maps to HTTP status codes and wire codes:
/// - `InvalidHeader`: 401 `invalid_header` - missing/malformed header,
///   unresolvable key, signature or parse failure
/// - `TokenExpired`: 401 `token_expired`
/// - `InvalidClaims`: 401 `invalid_claims` - issuer/audience mismatch
/// - `MissingPermissions`: 400 `invalid_claims` - no `permissions` claim
/// - `Forbidden`: 403 `unauthorized` - required permission absent
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid_header: {0}")]
    InvalidHeader(String),

    #[error("token_expired: token is expired")]
    TokenExpired,

    #[error("invalid_claims: incorrect claims, please check the audience and issuer")]
    InvalidClaims,

    #[error("invalid_claims: Permissions not included in JWT")]
    MissingPermissions,

    #[error("unauthorized: Permission not found.")]
    Forbidden,
}

impl AuthError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidHeader(_)
            | AuthError::TokenExpired
            | AuthError::InvalidClaims => StatusCode::UNAUTHORIZED,
            AuthError::MissingPermissions => StatusCode::BAD_REQUEST,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidHeader(_) => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims | AuthError::MissingPermissions => "invalid_claims",
            AuthError::Forbidden => "unauthorized",
        }
    }

    /// Human-readable description returned to the client.
    pub fn description(&self) -> String {
        match self {
            AuthError::InvalidHeader(reason) => reason.clone(),
            AuthError::TokenExpired => "token is expired".to_string(),
            AuthError::InvalidClaims => {
                "incorrect claims, please check the audience and issuer".to_string()
            }
            AuthError::MissingPermissions => "Permissions not included in JWT".to_string(),
            AuthError::Forbidden => "Permission not found.".to_string(),
        }
    }
}

/// Wire format for authorization failures.
#[derive(Serialize)]
struct AuthErrorBody {
    success: bool,
    error: u16,
    code: &'static str,
    description: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = AuthErrorBody {
            success: false,
            error: status.as_u16(),
            code: self.code(),
            description: self.description(),
        };
        (status, Json(body)).into_response()
    }
}
