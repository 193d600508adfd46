//! Request extractors.
//!
//! Axum's stock `Json` extractor renders rejections as plain-text
//! responses; this service's clients expect every failure in the JSON
//! error envelope, so body extraction goes through `JsonBody` instead.

use crate::errors::ApiError;
use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

/// JSON request body, with rejections mapped into the service's error
/// envelope.
///
/// - Syntactically invalid JSON (or a missing/wrong content type) is a
///   400 "Bad request"
/// - Well-formed JSON that does not match the target model is a 422
///   "Unprocessable Entity"
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(classify_rejection(rejection)),
        }
    }
}

fn classify_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        // Valid JSON, wrong shape for the model
        JsonRejection::JsonDataError(e) => {
            tracing::debug!(target: "casting.extractors", error = %e, "Request body failed model validation");
            ApiError::Unprocessable
        }
        other => {
            tracing::debug!(target: "casting.extractors", error = %other, "Request body is not valid JSON");
            ApiError::BadRequest
        }
    }
}
