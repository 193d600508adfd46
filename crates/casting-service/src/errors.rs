//! Casting service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl.
//! Database errors are logged server-side; clients only see the generic
//! message for the mapped status. Authorization failures render their own
//! structured body (see `auth::error`).

use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Casting service error type.
///
/// Maps to HTTP status codes:
/// - NotFound: 404
/// - Unprocessable: 422
/// - BadRequest: 400
/// - MethodNotAllowed: 405
/// - Database: 500
/// - Auth: 400/401/403 per the authorization taxonomy
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource was not found")]
    NotFound,

    #[error("Unprocessable Entity")]
    Unprocessable,

    #[error("Bad request")]
    BadRequest,

    #[error("Method not found")]
    MethodNotAllowed,

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Wire format for non-authorization failures.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: &'static str,
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(e) => e.status_code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Resource was not found"),
            ApiError::Unprocessable => (StatusCode::UNPROCESSABLE_ENTITY, "Unprocessable Entity"),
            ApiError::BadRequest => (StatusCode::BAD_REQUEST, "Bad request"),
            ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method not found"),
            ApiError::Database(err) => {
                // Log actual error server-side, return generic message
                tracing::error!(target: "casting.database", error = %err, "Database operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server error")
            }
            // Authorization errors carry their own structured body
            ApiError::Auth(e) => return e.into_response(),
        };

        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Unprocessable.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::Database("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Auth(AuthError::Forbidden).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_into_response_not_found() {
        let response = ApiError::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["success"], false);
        assert_eq!(body_json["error"], 404);
        assert_eq!(body_json["message"], "Resource was not found");
    }

    #[tokio::test]
    async fn test_into_response_unprocessable() {
        let response = ApiError::Unprocessable.into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"], 422);
        assert_eq!(body_json["message"], "Unprocessable Entity");
    }

    #[tokio::test]
    async fn test_into_response_method_not_allowed() {
        let response = ApiError::MethodNotAllowed.into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"], 405);
        assert_eq!(body_json["message"], "Method not found");
    }

    #[tokio::test]
    async fn test_into_response_database_error_is_generic() {
        let response = ApiError::Database("connection refused at 10.0.0.5".to_string())
            .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["message"], "Internal Server error");
        // Internal detail must never leak to the client
        assert!(!body_json.to_string().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_into_response_auth_error_uses_auth_body() {
        let response = ApiError::Auth(AuthError::Forbidden).into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["code"], "unauthorized");
        assert_eq!(body_json["description"], "Permission not found.");
    }
}
