//! Casting service configuration.
//!
//! Configuration is loaded from environment variables. The database URL is
//! redacted in Debug output to prevent credential leakage.

use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default JWKS cache TTL in seconds (5 minutes).
pub const DEFAULT_JWKS_CACHE_TTL_SECONDS: u64 = 300;

/// Maximum allowed JWKS cache TTL in seconds (1 hour).
///
/// Bounds how long a rotated-away key can keep being served.
pub const MAX_JWKS_CACHE_TTL_SECONDS: u64 = 3600;

/// Casting service configuration.
///
/// Loaded from environment variables; issuer and audience have no
/// defaults because token verification is meaningless without them.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Expected token issuer, matched exactly against the `iss` claim.
    pub auth_issuer: String,

    /// Audience that tokens must be issued for.
    pub auth_audience: String,

    /// URL of the issuer's JWKS endpoint.
    pub jwks_url: String,

    /// How long fetched signing keys are cached, in seconds.
    pub jwks_cache_ttl_seconds: u64,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("auth_issuer", &self.auth_issuer)
            .field("auth_audience", &self.auth_audience)
            .field("jwks_url", &self.jwks_url)
            .field("jwks_cache_ttl_seconds", &self.jwks_cache_ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWKS cache TTL configuration: {0}")]
    InvalidJwksCacheTtl(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let auth_issuer = vars
            .get("AUTH_ISSUER")
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_ISSUER".to_string()))?
            .clone();

        let auth_audience = vars
            .get("AUTH_AUDIENCE")
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_AUDIENCE".to_string()))?
            .clone();

        // Default JWKS URL is derived from the issuer's well-known location
        let jwks_url = vars.get("AUTH_JWKS_URL").cloned().unwrap_or_else(|| {
            format!(
                "{}/.well-known/jwks.json",
                auth_issuer.trim_end_matches('/')
            )
        });

        // Parse JWKS cache TTL with validation
        let jwks_cache_ttl_seconds =
            if let Some(value_str) = vars.get("JWKS_CACHE_TTL_SECONDS") {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidJwksCacheTtl(format!(
                        "JWKS_CACHE_TTL_SECONDS must be a valid positive integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value == 0 {
                    return Err(ConfigError::InvalidJwksCacheTtl(
                        "JWKS_CACHE_TTL_SECONDS must be greater than 0".to_string(),
                    ));
                }

                if value > MAX_JWKS_CACHE_TTL_SECONDS {
                    return Err(ConfigError::InvalidJwksCacheTtl(format!(
                        "JWKS_CACHE_TTL_SECONDS must not exceed {} seconds, got {}",
                        MAX_JWKS_CACHE_TTL_SECONDS, value
                    )));
                }

                value
            } else {
                DEFAULT_JWKS_CACHE_TTL_SECONDS
            };

        Ok(Config {
            database_url,
            bind_address,
            auth_issuer,
            auth_audience,
            jwks_url,
            jwks_cache_ttl_seconds,
        })
    }
}
