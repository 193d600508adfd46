//! Actors repository for database operations.

use crate::errors::ApiError;
use crate::models::{Actor, UpdateActorRequest};
use sqlx::{PgPool, Row};
use tracing::instrument;

/// Actors repository for database operations.
pub struct ActorsRepository;

impl ActorsRepository {
    /// List all actors, ordered by id.
    #[instrument(skip_all, name = "casting.repo.list_actors")]
    pub async fn list(pool: &PgPool) -> Result<Vec<Actor>, ApiError> {
        let rows = sqlx::query("SELECT id, name, age, gender FROM actors ORDER BY id")
            .fetch_all(pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Actor {
                id: row.get("id"),
                name: row.get("name"),
                age: row.get("age"),
                gender: row.get("gender"),
            })
            .collect())
    }

    /// Insert an actor; returns the new id.
    #[instrument(skip_all, name = "casting.repo.create_actor")]
    pub async fn create(
        pool: &PgPool,
        name: &str,
        age: i32,
        gender: &str,
    ) -> Result<i64, ApiError> {
        let row = sqlx::query(
            "INSERT INTO actors (name, age, gender) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(age)
        .bind(gender)
        .fetch_one(pool)
        .await?;

        Ok(row.get("id"))
    }

    /// Update an actor. Absent fields are left unchanged.
    ///
    /// Returns `false` if no actor with the given id exists.
    #[instrument(skip_all, name = "casting.repo.update_actor", fields(actor_id = %actor_id))]
    pub async fn update(
        pool: &PgPool,
        actor_id: i64,
        request: &UpdateActorRequest,
    ) -> Result<bool, ApiError> {
        let row = sqlx::query(
            r#"
            UPDATE actors
            SET
                name = COALESCE($2, name),
                age = COALESCE($3, age),
                gender = COALESCE($4, gender)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(actor_id)
        .bind(request.name.as_deref())
        .bind(request.age)
        .bind(request.gender.as_deref())
        .fetch_optional(pool)
        .await?;

        Ok(row.is_some())
    }

    /// Delete an actor, removing them from any movie casts first.
    ///
    /// Returns `false` if no actor with the given id exists.
    #[instrument(skip_all, name = "casting.repo.delete_actor", fields(actor_id = %actor_id))]
    pub async fn delete(pool: &PgPool, actor_id: i64) -> Result<bool, ApiError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM movie_actors WHERE actor_id = $1")
            .bind(actor_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query("DELETE FROM actors WHERE id = $1 RETURNING id")
            .bind(actor_id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.is_some())
    }
}
