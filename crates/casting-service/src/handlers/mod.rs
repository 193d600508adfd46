//! HTTP request handlers for the casting service.

pub mod actors;
pub mod health;
pub mod movies;

pub use actors::{create_actor, delete_actor, list_actors, update_actor};
pub use health::{health_check, readiness_check};
pub use movies::{create_movie, delete_movie, list_movies, update_movie};

use crate::errors::ApiError;

/// Fallback for requests that match no route. Renders the JSON error
/// envelope instead of axum's empty-body 404.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Fallback for requests that match a route but not its method set.
/// Wired outside the authorization gate so a wrong method reports 405,
/// not a credential failure.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Map database failures on write paths to 422 Unprocessable Entity,
/// keeping the underlying cause in the server-side log. Non-database
/// errors pass through unchanged.
pub(crate) fn unprocessable_on_db_error(err: ApiError) -> ApiError {
    match err {
        ApiError::Database(cause) => {
            tracing::warn!(target: "casting.handlers", error = %cause, "Write rejected by database");
            ApiError::Unprocessable
        }
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_db_error_becomes_unprocessable() {
        let mapped = unprocessable_on_db_error(ApiError::Database("boom".to_string()));
        assert_eq!(mapped.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_non_db_error_passes_through() {
        let mapped = unprocessable_on_db_error(ApiError::NotFound);
        assert_eq!(mapped.status_code(), StatusCode::NOT_FOUND);
    }
}
