//! JWKS client for fetching and caching the issuer's public signing keys.
//!
//! The JWKS (JSON Web Key Set) client fetches RSA public keys from the
//! issuer's `/.well-known/jwks.json` endpoint and caches them with a
//! configurable TTL.
//!
//! # Security
//!
//! - Keys are cached to reduce load on the issuer and improve latency
//! - Cache is invalidated on TTL expiry to pick up key rotations
//! - The cache entry is replaced wholesale; readers never observe a
//!   partially-updated key set
//! - Concurrent cache misses are coalesced into a single outbound fetch

use crate::auth::error::AuthError;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

/// Default cache TTL in seconds (5 minutes).
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Timeout for the outbound JWKS fetch. A slow issuer fails the pending
/// validation instead of hanging the request.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum interval between refreshes triggered by an unknown `kid`.
///
/// Lets a freshly rotated-in key validate before the cache TTL lapses,
/// while bounding how often garbage kids can force upstream fetches.
const UNKNOWN_KID_REFRESH_COOLDOWN: Duration = Duration::from_secs(10);

/// JSON Web Key from the JWKS endpoint.
///
/// Only RSA signing keys are usable by the validator; the `n`/`e` fields
/// carry the public modulus and exponent in base64url encoding.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (must be "RSA" for RS256).
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    pub kid: String,

    /// RSA public modulus (base64url encoded).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url encoded).
    #[serde(default)]
    pub e: Option<String>,

    /// Algorithm (should be "RS256").
    #[serde(default)]
    pub alg: Option<String>,

    /// Key use (should be "sig" for signing).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
}

/// JWKS document published by the issuer.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    /// List of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

/// Cached JWKS data with expiry time.
struct CachedJwks {
    /// Map of key ID to JWK. Keying by `kid` upholds the unique-identifier
    /// invariant within a set.
    keys: HashMap<String, Jwk>,

    /// When this cache entry was fetched.
    fetched_at: Instant,

    /// When this cache entry expires.
    expires_at: Instant,
}

impl CachedJwks {
    fn is_fresh(&self) -> bool {
        self.expires_at > Instant::now()
    }

    /// Whether an unknown-kid miss on this entry may trigger a refresh.
    fn can_retry_unknown_kid(&self, cooldown: Duration) -> bool {
        self.fetched_at.elapsed() >= cooldown
    }
}

/// JWKS client for fetching and caching public keys.
///
/// Thread-safe; intended to be shared behind an `Arc` by all request
/// handlers. The cache is the only shared mutable state in the
/// authorization pipeline.
pub struct JwksClient {
    /// URL to the JWKS endpoint.
    jwks_url: String,

    /// HTTP client for fetching JWKS.
    http_client: reqwest::Client,

    /// Cached JWKS data.
    cache: RwLock<Option<CachedJwks>>,

    /// Serializes refreshes so concurrent misses trigger one fetch.
    refresh_guard: Mutex<()>,

    /// Cache TTL duration.
    cache_ttl: Duration,

    /// Minimum interval between unknown-kid-triggered refreshes.
    unknown_kid_cooldown: Duration,
}

impl JwksClient {
    /// Create a new JWKS client with the default cache TTL.
    pub fn new(jwks_url: String) -> Self {
        Self::with_ttl(jwks_url, Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS))
    }

    /// Create a new JWKS client with a custom cache TTL.
    pub fn with_ttl(jwks_url: String, cache_ttl: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "casting.auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
            cache: RwLock::new(None),
            refresh_guard: Mutex::new(()),
            cache_ttl,
            unknown_kid_cooldown: UNKNOWN_KID_REFRESH_COOLDOWN,
        }
    }

    #[cfg(test)]
    fn set_unknown_kid_cooldown(&mut self, cooldown: Duration) {
        self.unknown_kid_cooldown = cooldown;
    }

    /// Get a JWK by key ID.
    ///
    /// Serves from the cache when fresh; otherwise refreshes from the
    /// issuer first. An unknown key ID may trigger one early refresh per
    /// cooldown window to pick up newly rotated keys. A key ID unknown
    /// even after a refresh signals a token signed by an unrecognized key
    /// (rotated-away key, wrong issuer, or tampering) and is rejected.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidHeader` if the key cannot be resolved,
    /// including when the JWKS endpoint is unreachable or times out.
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        // Fast path: fresh cache holding the key. An unknown kid on a
        // fresh cache falls through to the slow path when the cooldown
        // allows another fetch, so a just-rotated-in key validates
        // without waiting out the TTL.
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_fresh() {
                    if let Some(key) = cached.keys.get(kid) {
                        tracing::debug!(target: "casting.auth.jwks", kid = %kid, "JWKS cache hit");
                        return Ok(key.clone());
                    }
                    if !cached.can_retry_unknown_kid(self.unknown_kid_cooldown) {
                        tracing::debug!(target: "casting.auth.jwks", kid = %kid, "Key not found in JWKS cache");
                        return Err(AuthError::InvalidHeader(
                            "Unable to find the appropriate key".to_string(),
                        ));
                    }
                }
            }
        }

        // Slow path: refresh, coalescing concurrent misses into one fetch.
        // Whoever holds the guard re-checks the cache first, so waiters
        // behind an in-flight refresh reuse its result.
        {
            let _guard = self.refresh_guard.lock().await;

            let needs_refresh = {
                let cache = self.cache.read().await;
                match cache.as_ref() {
                    Some(cached) if cached.is_fresh() => {
                        !cached.keys.contains_key(kid)
                            && cached.can_retry_unknown_kid(self.unknown_kid_cooldown)
                    }
                    _ => true,
                }
            };

            if needs_refresh {
                self.refresh_cache().await?;
            }
        }

        let cache = self.cache.read().await;
        if let Some(cached) = cache.as_ref() {
            if let Some(key) = cached.keys.get(kid) {
                return Ok(key.clone());
            }
        }

        tracing::warn!(target: "casting.auth.jwks", kid = %kid, "Key not found in JWKS after refresh");
        Err(AuthError::InvalidHeader(
            "Unable to find the appropriate key".to_string(),
        ))
    }

    /// Refresh the JWKS cache by fetching from the issuer.
    #[instrument(skip(self))]
    async fn refresh_cache(&self) -> Result<(), AuthError> {
        tracing::debug!(target: "casting.auth.jwks", url = %self.jwks_url, "Fetching JWKS from issuer");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "casting.auth.jwks", error = %e, "Failed to fetch JWKS");
                AuthError::InvalidHeader("Unable to verify the signing key".to_string())
            })?;

        if !response.status().is_success() {
            tracing::error!(
                target: "casting.auth.jwks",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(AuthError::InvalidHeader(
                "Unable to verify the signing key".to_string(),
            ));
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            tracing::error!(target: "casting.auth.jwks", error = %e, "Failed to parse JWKS response");
            AuthError::InvalidHeader("Unable to verify the signing key".to_string())
        })?;

        let keys: HashMap<String, Jwk> = jwks
            .keys
            .into_iter()
            .map(|key| (key.kid.clone(), key))
            .collect();

        tracing::info!(
            target: "casting.auth.jwks",
            key_count = keys.len(),
            "JWKS cache refreshed"
        );

        // Atomic wholesale replacement
        let now = Instant::now();
        let mut cache = self.cache.write().await;
        *cache = Some(CachedJwks {
            keys,
            fetched_at: now,
            expires_at: now + self.cache_ttl,
        });

        Ok(())
    }

    /// Force refresh the cache.
    ///
    /// Used when the issuer rotates keys before the TTL elapses.
    #[allow(dead_code)] // API for manual cache invalidation
    pub async fn force_refresh(&self) -> Result<(), AuthError> {
        let _guard = self.refresh_guard.lock().await;
        self.refresh_cache().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_jwk_deserialization() {
        let json = r#"{
            "kty": "RSA",
            "kid": "key-01",
            "n": "xGOr-H7A",
            "e": "AQAB",
            "alg": "RS256",
            "use": "sig"
        }"#;

        let jwk: Jwk = serde_json::from_str(json).unwrap();

        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.kid, "key-01");
        assert_eq!(jwk.n, Some("xGOr-H7A".to_string()));
        assert_eq!(jwk.e, Some("AQAB".to_string()));
        assert_eq!(jwk.alg, Some("RS256".to_string()));
        assert_eq!(jwk.key_use, Some("sig".to_string()));
    }

    #[test]
    fn test_jwk_deserialization_minimal() {
        // Only required fields
        let json = r#"{
            "kty": "RSA",
            "kid": "key-02"
        }"#;

        let jwk: Jwk = serde_json::from_str(json).unwrap();

        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.kid, "key-02");
        assert!(jwk.n.is_none());
        assert!(jwk.e.is_none());
        assert!(jwk.alg.is_none());
        assert!(jwk.key_use.is_none());
    }

    #[test]
    fn test_jwks_response_deserialization() {
        let json = r#"{
            "keys": [
                {"kty": "RSA", "kid": "key-1"},
                {"kty": "RSA", "kid": "key-2"}
            ]
        }"#;

        let jwks: JwksResponse = serde_json::from_str(json).unwrap();

        assert_eq!(jwks.keys.len(), 2);
        assert_eq!(jwks.keys.first().unwrap().kid, "key-1");
        assert_eq!(jwks.keys.get(1).unwrap().kid, "key-2");
    }

    #[test]
    fn test_jwks_client_creation() {
        let client =
            JwksClient::new("https://issuer.test/.well-known/jwks.json".to_string());
        assert_eq!(
            client.jwks_url,
            "https://issuer.test/.well-known/jwks.json"
        );
        assert_eq!(
            client.cache_ttl,
            Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS)
        );
    }

    #[test]
    fn test_jwks_client_custom_ttl() {
        let client = JwksClient::with_ttl(
            "https://issuer.test/.well-known/jwks.json".to_string(),
            Duration::from_secs(60),
        );
        assert_eq!(client.cache_ttl, Duration::from_secs(60));
    }

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rsa_jwk(kid: &str) -> serde_json::Value {
        serde_json::json!({
            "kty": "RSA",
            "kid": kid,
            "n": "xGOr-H7A",
            "e": "AQAB",
            "alg": "RS256",
            "use": "sig"
        })
    }

    async fn mount_keys(server: &MockServer, kids: &[&str], expected_fetches: u64) {
        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "keys": kids.iter().map(|kid| rsa_jwk(kid)).collect::<Vec<_>>()
            })))
            .expect(expected_fetches)
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> JwksClient {
        JwksClient::new(format!("{}/.well-known/jwks.json", server.uri()))
    }

    #[tokio::test]
    async fn test_unknown_kid_refreshes_and_finds_rotated_key() {
        let server = MockServer::start().await;
        mount_keys(&server, &["key-1"], 1).await;

        let mut client = client_for(&server);
        client.set_unknown_kid_cooldown(Duration::ZERO);

        assert_eq!(client.get_key("key-1").await.unwrap().kid, "key-1");

        // Issuer rotates a new key in; the cache is still fresh but the
        // unknown kid triggers an early refresh.
        mount_keys(&server, &["key-1", "key-2"], 1).await;

        assert_eq!(client.get_key("key-2").await.unwrap().kid, "key-2");
    }

    #[tokio::test]
    async fn test_unknown_kid_refresh_is_rate_limited() {
        let server = MockServer::start().await;
        // One cold fetch only; unknown-kid misses within the cooldown
        // must not hit the endpoint again.
        mount_keys(&server, &["key-1"], 1).await;

        let client = client_for(&server);

        assert!(client.get_key("key-1").await.is_ok());

        for _ in 0..3 {
            let result = client.get_key("no-such-key").await;
            assert!(matches!(result, Err(AuthError::InvalidHeader(_))));
        }
    }

    #[tokio::test]
    async fn test_get_key_unreachable_endpoint_is_invalid_header() {
        // Nothing listens here; the fetch fails fast with a connection
        // error and classifies as invalid_header rather than hanging.
        let client = JwksClient::new("http://127.0.0.1:1/.well-known/jwks.json".to_string());

        let result = client.get_key("any-kid").await;
        assert!(matches!(result, Err(AuthError::InvalidHeader(_))));
    }
}
