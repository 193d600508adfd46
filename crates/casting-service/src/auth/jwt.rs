//! JWT validation against the issuer's JWKS.
//!
//! Validates incoming bearer tokens using RSA public keys fetched from the
//! issuer's JWKS endpoint.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only RS256 is accepted; tokens declaring any other algorithm are
//!   rejected to prevent algorithm-confusion attacks
//! - Expiration, issuer, and audience claims are all validated
//! - Failure details are logged server-side; client-facing descriptions
//!   stay generic

use crate::auth::claims::Claims;
use crate::auth::error::AuthError;
use crate::auth::jwks::{Jwk, JwksClient};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::instrument;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Oversized tokens are rejected before any base64 or cryptographic work.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// JWT validator using JWKS published by the configured issuer.
///
/// Stateless apart from the injected key resolver; each call validates
/// one token end to end.
pub struct JwtValidator {
    /// JWKS client for resolving public keys by `kid`.
    jwks_client: Arc<JwksClient>,

    /// Expected `iss` claim (exact string match).
    issuer: String,

    /// Audience that must be included in the `aud` claim.
    audience: String,
}

impl JwtValidator {
    /// Create a new JWT validator.
    pub fn new(jwks_client: Arc<JwksClient>, issuer: String, audience: String) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
        }
    }

    /// Validate a bearer token and return the verified claims.
    ///
    /// Steps, each failing the request terminally:
    ///
    /// 1. Structural check - size cap and exactly three dot-separated segments
    /// 2. Extract `kid` from the (unverified) header segment
    /// 3. Resolve the public key via the JWKS client
    /// 4. Verify RS256 signature, expiry, issuer, and audience
    ///
    /// # Errors
    ///
    /// - `invalid_header` (401) for structural, key-resolution, and
    ///   signature failures
    /// - `token_expired` (401) when the `exp` claim has passed
    /// - `invalid_claims` (401) on issuer or audience mismatch
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let kid = extract_kid(token)?;

        let jwk = self.jwks_client.get_key(&kid).await?;

        let claims = verify_token(token, &jwk, &self.issuer, &self.audience)?;

        tracing::debug!(target: "casting.auth.jwt", "Token validated successfully");
        Ok(claims)
    }
}

/// Extract the `kid` from a JWT header without verifying the signature.
///
/// Performs the structural checks: size cap, three-segment shape, base64url
/// header decoding, and a non-empty string `kid`.
pub(crate) fn extract_kid(token: &str) -> Result<String, AuthError> {
    // Size check first (DoS prevention)
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "casting.auth.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(AuthError::InvalidHeader(
            "Authorization malformed".to_string(),
        ));
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "casting.auth.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(AuthError::InvalidHeader(
            "Authorization malformed".to_string(),
        ));
    }

    let header_part = parts.first().ok_or_else(|| {
        AuthError::InvalidHeader("Authorization malformed".to_string())
    })?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "casting.auth.jwt", error = %e, "Failed to decode JWT header base64");
        AuthError::InvalidHeader("Authorization malformed".to_string())
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "casting.auth.jwt", error = %e, "Failed to parse JWT header JSON");
        AuthError::InvalidHeader("Authorization malformed".to_string())
    })?;

    // Extract kid as string, rejecting empty values
    header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| AuthError::InvalidHeader("Authorization malformed".to_string()))
}

/// Verify the token signature and standard claims against a resolved JWK.
fn verify_token(
    token: &str,
    jwk: &Jwk,
    issuer: &str,
    audience: &str,
) -> Result<Claims, AuthError> {
    // Validate the JWK is an RS256 signing key
    if jwk.kty != "RSA" {
        tracing::warn!(target: "casting.auth.jwt", kty = %jwk.kty, "Unexpected JWK key type");
        return Err(AuthError::InvalidHeader(
            "Unable to parse the authentication token".to_string(),
        ));
    }
    if let Some(alg) = &jwk.alg {
        if alg != "RS256" {
            tracing::warn!(target: "casting.auth.jwt", alg = %alg, "Unexpected JWK algorithm");
            return Err(AuthError::InvalidHeader(
                "Unable to parse the authentication token".to_string(),
            ));
        }
    }

    let (n, e) = match (&jwk.n, &jwk.e) {
        (Some(n), Some(e)) => (n, e),
        _ => {
            tracing::error!(target: "casting.auth.jwt", kid = %jwk.kid, "JWK missing RSA components");
            return Err(AuthError::InvalidHeader(
                "Unable to parse the authentication token".to_string(),
            ));
        }
    };

    let decoding_key = DecodingKey::from_rsa_components(n, e).map_err(|e| {
        tracing::error!(target: "casting.auth.jwt", error = %e, "Invalid RSA key material in JWK");
        AuthError::InvalidHeader("Unable to parse the authentication token".to_string())
    })?;

    // RS256 only: a token declaring any other algorithm fails verification
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = true;
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "casting.auth.jwt", error = %e, "Token verification failed");
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
            _ => AuthError::InvalidHeader(
                "Unable to parse the authentication token".to_string(),
            ),
        }
    })?;

    Ok(token_data.claims)
}
