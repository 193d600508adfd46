//! Movies repository for database operations.
//!
//! Movies carry a cast of actor ids through the `movie_actors` join table.
//! Cast replacement happens inside the same transaction as the movie write,
//! so readers never observe a half-updated cast.

use crate::errors::ApiError;
use crate::models::{Movie, UpdateMovieRequest};
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::collections::HashMap;
use tracing::instrument;

/// Movies repository for database operations.
pub struct MoviesRepository;

impl MoviesRepository {
    /// List all movies with their cast, ordered by id.
    #[instrument(skip_all, name = "casting.repo.list_movies")]
    pub async fn list(pool: &PgPool) -> Result<Vec<Movie>, ApiError> {
        let rows = sqlx::query("SELECT id, title, release_date FROM movies ORDER BY id")
            .fetch_all(pool)
            .await?;

        let cast_rows = sqlx::query(
            "SELECT movie_id, actor_id FROM movie_actors ORDER BY movie_id, actor_id",
        )
        .fetch_all(pool)
        .await?;

        let mut cast: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in &cast_rows {
            cast.entry(row.get("movie_id"))
                .or_default()
                .push(row.get("actor_id"));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let id: i64 = row.get("id");
                Movie {
                    id,
                    title: row.get("title"),
                    release_date: row.get("release_date"),
                    actors: cast.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }

    /// Insert a movie and cast the given actors.
    ///
    /// Actor ids that do not exist are ignored, matching the permissive
    /// behavior of the original casting workflow.
    #[instrument(skip_all, name = "casting.repo.create_movie")]
    pub async fn create(
        pool: &PgPool,
        title: &str,
        release_date: NaiveDate,
        actor_ids: &[i64],
    ) -> Result<i64, ApiError> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query(
            "INSERT INTO movies (title, release_date) VALUES ($1, $2) RETURNING id",
        )
        .bind(title)
        .bind(release_date)
        .fetch_one(&mut *tx)
        .await?;
        let movie_id: i64 = row.get("id");

        replace_cast(&mut tx, movie_id, actor_ids).await?;

        tx.commit().await?;
        Ok(movie_id)
    }

    /// Update a movie. Absent fields are left unchanged; a `Some` cast
    /// replaces the existing one wholesale.
    ///
    /// Returns `false` if no movie with the given id exists.
    #[instrument(skip_all, name = "casting.repo.update_movie", fields(movie_id = %movie_id))]
    pub async fn update(
        pool: &PgPool,
        movie_id: i64,
        request: &UpdateMovieRequest,
    ) -> Result<bool, ApiError> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE movies
            SET
                title = COALESCE($2, title),
                release_date = COALESCE($3, release_date)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(movie_id)
        .bind(request.title.as_deref())
        .bind(request.release_date)
        .fetch_optional(&mut *tx)
        .await?;

        if row.is_none() {
            return Ok(false);
        }

        if let Some(actor_ids) = &request.actors {
            sqlx::query("DELETE FROM movie_actors WHERE movie_id = $1")
                .bind(movie_id)
                .execute(&mut *tx)
                .await?;
            replace_cast(&mut tx, movie_id, actor_ids).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Delete a movie and its cast rows.
    ///
    /// Returns `false` if no movie with the given id exists.
    #[instrument(skip_all, name = "casting.repo.delete_movie", fields(movie_id = %movie_id))]
    pub async fn delete(pool: &PgPool, movie_id: i64) -> Result<bool, ApiError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM movie_actors WHERE movie_id = $1")
            .bind(movie_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query("DELETE FROM movies WHERE id = $1 RETURNING id")
            .bind(movie_id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.is_some())
    }
}

/// Insert cast rows for the actor ids that actually exist.
async fn replace_cast(
    tx: &mut Transaction<'_, Postgres>,
    movie_id: i64,
    actor_ids: &[i64],
) -> Result<(), ApiError> {
    if actor_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO movie_actors (movie_id, actor_id)
        SELECT $1, id FROM actors WHERE id = ANY($2)
        "#,
    )
    .bind(movie_id)
    .bind(actor_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
