//! Casting agency service library.
//!
//! An HTTP API for managing a catalog of movies and actors, protected by
//! JWT bearer-token authorization. Signing keys are resolved from the
//! issuer's JWKS endpoint and cached, tokens are validated as RS256, and
//! each route requires a specific permission from the token's
//! `permissions` claim.

pub mod auth;
pub mod config;
pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
