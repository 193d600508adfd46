//! Movie handlers.
//!
//! Implements the movie CRUD endpoints:
//!
//! - `GET /movies` - list movies (requires `get:movies`)
//! - `POST /movies` - create a movie (requires `post:movies`)
//! - `PATCH /movies/:id` - edit a movie (requires `patch:movies`)
//! - `DELETE /movies/:id` - delete a movie (requires `delete:movies`)
//!
//! Every successful response carries the full id-ordered movie list.
//! Authorization happens entirely in the route-layer gate; by the time a
//! handler runs, the request carries verified claims.

use crate::errors::ApiError;
use crate::extractors::JsonBody;
use crate::handlers::unprocessable_on_db_error;
use crate::models::{CreateMovieRequest, MoviesResponse, UpdateMovieRequest};
use crate::repositories::MoviesRepository;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Handler for GET /movies.
///
/// Returns 404 when no movies exist, matching the collection semantics of
/// the casting workflow.
#[instrument(skip_all, name = "casting.handlers.list_movies")]
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MoviesResponse>, ApiError> {
    let movies = MoviesRepository::list(&state.pool).await?;

    if movies.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(MoviesResponse {
        success: true,
        movies,
    }))
}

/// Handler for POST /movies.
#[instrument(skip_all, name = "casting.handlers.create_movie")]
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CreateMovieRequest>,
) -> Result<Json<MoviesResponse>, ApiError> {
    let movie_id = MoviesRepository::create(
        &state.pool,
        &request.title,
        request.release_date,
        &request.actors,
    )
    .await
    .map_err(unprocessable_on_db_error)?;

    info!(target: "casting.handlers.movies", movie_id, "Movie created");

    let movies = MoviesRepository::list(&state.pool).await?;
    Ok(Json(MoviesResponse {
        success: true,
        movies,
    }))
}

/// Handler for PATCH /movies/:id.
#[instrument(skip_all, name = "casting.handlers.update_movie", fields(movie_id = %movie_id))]
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
    JsonBody(request): JsonBody<UpdateMovieRequest>,
) -> Result<Json<MoviesResponse>, ApiError> {
    let found = MoviesRepository::update(&state.pool, movie_id, &request)
        .await
        .map_err(unprocessable_on_db_error)?;

    if !found {
        return Err(ApiError::NotFound);
    }

    let movies = MoviesRepository::list(&state.pool).await?;
    Ok(Json(MoviesResponse {
        success: true,
        movies,
    }))
}

/// Handler for DELETE /movies/:id.
#[instrument(skip_all, name = "casting.handlers.delete_movie", fields(movie_id = %movie_id))]
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
) -> Result<Json<MoviesResponse>, ApiError> {
    let found = MoviesRepository::delete(&state.pool, movie_id)
        .await
        .map_err(unprocessable_on_db_error)?;

    if !found {
        return Err(ApiError::NotFound);
    }

    info!(target: "casting.handlers.movies", movie_id, "Movie deleted");

    let movies = MoviesRepository::list(&state.pool).await?;
    Ok(Json(MoviesResponse {
        success: true,
        movies,
    }))
}
