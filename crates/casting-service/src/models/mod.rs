//! Casting service models.
//!
//! Row types returned by the repositories and the request/response DTOs
//! for the movie and actor endpoints. Responses use the
//! `{"success": true, ...}` envelope carrying the full id-ordered
//! collection after the operation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A movie record with its cast, as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: NaiveDate,
    /// Ids of actors cast in this movie.
    pub actors: Vec<i64>,
}

/// An actor record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub gender: String,
}

/// Response envelope for movie endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviesResponse {
    pub success: bool,
    pub movies: Vec<Movie>,
}

/// Response envelope for actor endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorsResponse {
    pub success: bool,
    pub actors: Vec<Actor>,
}

/// Request body for POST /movies.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub release_date: NaiveDate,
    /// Actor ids to cast; unknown ids are ignored.
    #[serde(default)]
    pub actors: Vec<i64>,
}

/// Request body for PATCH /movies/:id. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub actors: Option<Vec<i64>>,
}

/// Request body for POST /actors.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateActorRequest {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

/// Request body for PATCH /actors/:id. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateActorRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_movies_response_serialization() {
        let response = MoviesResponse {
            success: true,
            movies: vec![Movie {
                id: 1,
                title: "Terminator".to_string(),
                release_date: NaiveDate::from_ymd_opt(2002, 12, 4).unwrap(),
                actors: vec![1],
            }],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["movies"][0]["title"], "Terminator");
        assert_eq!(json["movies"][0]["release_date"], "2002-12-04");
        assert_eq!(json["movies"][0]["actors"][0], 1);
    }

    #[test]
    fn test_create_movie_request_defaults_actors() {
        let request: CreateMovieRequest = serde_json::from_str(
            r#"{"title": "Terminator", "release_date": "2002-12-04"}"#,
        )
        .unwrap();
        assert!(request.actors.is_empty());
    }

    #[test]
    fn test_create_movie_request_rejects_bad_date() {
        let result = serde_json::from_str::<CreateMovieRequest>(
            r#"{"title": "Terminator", "release_date": "hey there"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_update_actor_request_partial() {
        let request: UpdateActorRequest =
            serde_json::from_str(r#"{"age": 26}"#).unwrap();
        assert!(request.name.is_none());
        assert_eq!(request.age, Some(26));
        assert!(request.gender.is_none());
    }
}
