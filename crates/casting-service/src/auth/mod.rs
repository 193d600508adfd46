//! Authorization core for the casting service.
//!
//! Handles bearer-token verification against the identity provider's JWKS
//! endpoint and permission enforcement over verified claims.
//!
//! # Components
//!
//! - `jwks` - JWKS client for fetching and caching the issuer's RSA keys
//! - `jwt` - JWT validation using cached JWKS keys (RS256 only)
//! - `claims` - verified claim set carried into handlers
//! - `permissions` - per-endpoint permission enforcement
//! - `error` - the structured authorization error taxonomy

pub mod claims;
pub mod error;
pub mod jwks;
pub mod jwt;
pub mod permissions;

pub use claims::Claims;
pub use error::AuthError;
pub use jwks::JwksClient;
pub use jwt::JwtValidator;
pub use permissions::check_permission;
