//! Actor handlers.
//!
//! Implements the actor CRUD endpoints:
//!
//! - `GET /actors` - list actors (requires `get:actors`)
//! - `POST /actors` - create an actor (requires `post:actors`)
//! - `PATCH /actors/:id` - edit an actor (requires `patch:actors`)
//! - `DELETE /actors/:id` - delete an actor (requires `delete:actors`)
//!
//! Every successful response carries the full id-ordered actor list.

use crate::errors::ApiError;
use crate::extractors::JsonBody;
use crate::handlers::unprocessable_on_db_error;
use crate::models::{ActorsResponse, CreateActorRequest, UpdateActorRequest};
use crate::repositories::ActorsRepository;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Handler for GET /actors.
///
/// Returns 404 when no actors exist.
#[instrument(skip_all, name = "casting.handlers.list_actors")]
pub async fn list_actors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActorsResponse>, ApiError> {
    let actors = ActorsRepository::list(&state.pool).await?;

    if actors.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(ActorsResponse {
        success: true,
        actors,
    }))
}

/// Handler for POST /actors.
#[instrument(skip_all, name = "casting.handlers.create_actor")]
pub async fn create_actor(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CreateActorRequest>,
) -> Result<Json<ActorsResponse>, ApiError> {
    let actor_id =
        ActorsRepository::create(&state.pool, &request.name, request.age, &request.gender)
            .await
            .map_err(unprocessable_on_db_error)?;

    info!(target: "casting.handlers.actors", actor_id, "Actor created");

    let actors = ActorsRepository::list(&state.pool).await?;
    Ok(Json(ActorsResponse {
        success: true,
        actors,
    }))
}

/// Handler for PATCH /actors/:id.
#[instrument(skip_all, name = "casting.handlers.update_actor", fields(actor_id = %actor_id))]
pub async fn update_actor(
    State(state): State<Arc<AppState>>,
    Path(actor_id): Path<i64>,
    JsonBody(request): JsonBody<UpdateActorRequest>,
) -> Result<Json<ActorsResponse>, ApiError> {
    let found = ActorsRepository::update(&state.pool, actor_id, &request)
        .await
        .map_err(unprocessable_on_db_error)?;

    if !found {
        return Err(ApiError::NotFound);
    }

    let actors = ActorsRepository::list(&state.pool).await?;
    Ok(Json(ActorsResponse {
        success: true,
        actors,
    }))
}

/// Handler for DELETE /actors/:id.
#[instrument(skip_all, name = "casting.handlers.delete_actor", fields(actor_id = %actor_id))]
pub async fn delete_actor(
    State(state): State<Arc<AppState>>,
    Path(actor_id): Path<i64>,
) -> Result<Json<ActorsResponse>, ApiError> {
    let found = ActorsRepository::delete(&state.pool, actor_id)
        .await
        .map_err(unprocessable_on_db_error)?;

    if !found {
        return Err(ApiError::NotFound);
    }

    info!(target: "casting.handlers.actors", actor_id, "Actor deleted");

    let actors = ActorsRepository::list(&state.pool).await?;
    Ok(Json(ActorsResponse {
        success: true,
        actors,
    }))
}
