//! HTTP routes for the casting service.
//!
//! Defines the Axum router and application state. Every protected route is
//! wired with its required permission at the call site; the authorization
//! gate runs as a route layer before any handler.

use crate::auth::{JwksClient, JwtValidator};
use crate::config::Config;
use crate::handlers;
use crate::middleware::{require_permission, AuthGate};
use axum::{
    middleware,
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes with a gate derived from configuration.
///
/// Creates the JWKS client and JWT validator from the configured issuer,
/// audience, and JWKS URL, then delegates to [`build_routes_with_gate`].
pub fn build_routes(state: Arc<AppState>) -> Router {
    let jwks_client = Arc::new(JwksClient::with_ttl(
        state.config.jwks_url.clone(),
        Duration::from_secs(state.config.jwks_cache_ttl_seconds),
    ));
    let jwt_validator = Arc::new(JwtValidator::new(
        jwks_client,
        state.config.auth_issuer.clone(),
        state.config.auth_audience.clone(),
    ));
    let gate = AuthGate::new(jwt_validator);

    build_routes_with_gate(state, gate)
}

/// Build the application routes around an existing authorization gate.
///
/// Split out so tests can inject a gate pointed at a mock JWKS endpoint.
///
/// Routes:
/// - `/health`, `/ready` - public probes
/// - `/movies`, `/movies/:id` - movie CRUD, one permission per operation
/// - `/actors`, `/actors/:id` - actor CRUD, one permission per operation
pub fn build_routes_with_gate(state: Arc<AppState>, gate: AuthGate) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check));

    // Protected routes: the required permission is passed explicitly at
    // each wiring call site. The method fallback sits outside the gate,
    // so an unsupported method reports 405 rather than 401.
    let protected_routes = Router::new()
        .route(
            "/movies",
            protected(&gate, get(handlers::list_movies), "get:movies")
                .merge(protected(&gate, post(handlers::create_movie), "post:movies"))
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/movies/:id",
            protected(&gate, patch(handlers::update_movie), "patch:movies")
                .merge(protected(&gate, delete(handlers::delete_movie), "delete:movies"))
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/actors",
            protected(&gate, get(handlers::list_actors), "get:actors")
                .merge(protected(&gate, post(handlers::create_actor), "post:actors"))
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/actors/:id",
            protected(&gate, patch(handlers::update_actor), "patch:actors")
                .merge(protected(&gate, delete(handlers::delete_actor), "delete:actors"))
                .fallback(handlers::method_not_allowed),
        );

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - bound request duration (innermost)
    // 2. TraceLayer - log request details
    public_routes
        .merge(protected_routes)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}

/// Gate a method's handler behind its required permission. The layer is
/// attached per method, leaving the path's 405 fallback ungated.
fn protected(
    gate: &AuthGate,
    method_router: MethodRouter<Arc<AppState>>,
    permission: &'static str,
) -> MethodRouter<Arc<AppState>> {
    method_router.route_layer(middleware::from_fn_with_state(
        gate.require(permission),
        require_permission,
    ))
}
