//! Middleware for the casting service.
//!
//! # Components
//!
//! - `auth` - authorization gate applied per protected route

pub mod auth;

pub use auth::{require_permission, AuthGate, RoutePermission};
