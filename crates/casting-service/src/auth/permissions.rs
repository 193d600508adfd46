//! Permission enforcement over verified claims.
//!
//! Permission checks are deliberately permission-based rather than
//! role-based: how roles map to permissions lives entirely in the issuer,
//! keeping this enforcement point a pure containment check.

use crate::auth::claims::Claims;
use crate::auth::error::AuthError;

/// Check that the verified claims carry the required permission.
///
/// An empty `required` permission succeeds unconditionally, for endpoints
/// that require authentication only.
///
/// # Errors
///
/// - `invalid_claims` (400) if the token carries no `permissions` claim
/// - `unauthorized` (403) if the required permission is absent
pub fn check_permission(claims: &Claims, required: &str) -> Result<(), AuthError> {
    if required.is_empty() {
        return Ok(());
    }

    let Some(permissions) = claims.permissions.as_deref() else {
        tracing::debug!(target: "casting.auth.permissions", "Token has no permissions claim");
        return Err(AuthError::MissingPermissions);
    };

    if !permissions.iter().any(|p| p == required) {
        tracing::debug!(
            target: "casting.auth.permissions",
            required = %required,
            "Required permission not present in token"
        );
        return Err(AuthError::Forbidden);
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::auth::claims::Audience;

    fn claims(permissions: Option<Vec<&str>>) -> Claims {
        Claims {
            iss: "https://casting-agency.test/".to_string(),
            sub: "user".to_string(),
            aud: Audience::Single("casting".to_string()),
            exp: 9_999_999_999,
            permissions: permissions
                .map(|perms| perms.into_iter().map(ToString::to_string).collect()),
        }
    }

    #[test]
    fn test_permission_present_succeeds() {
        let claims = claims(Some(vec!["get:movies", "post:movies"]));
        assert!(check_permission(&claims, "get:movies").is_ok());
        assert!(check_permission(&claims, "post:movies").is_ok());
    }

    #[test]
    fn test_permission_absent_is_forbidden() {
        let claims = claims(Some(vec!["get:movies"]));
        assert_eq!(
            check_permission(&claims, "post:movies"),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn test_empty_permission_list_is_forbidden() {
        let claims = claims(Some(vec![]));
        assert_eq!(
            check_permission(&claims, "get:actors"),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn test_missing_permissions_claim_is_invalid_claims() {
        let claims = claims(None);
        assert_eq!(
            check_permission(&claims, "get:movies"),
            Err(AuthError::MissingPermissions)
        );
    }

    #[test]
    fn test_empty_required_permission_always_succeeds() {
        // Authentication-only endpoints: no permission configured
        let claims = claims(None);
        assert!(check_permission(&claims, "").is_ok());
    }

    #[test]
    fn test_no_partial_match() {
        let claims = claims(Some(vec!["get:movies"]));
        assert_eq!(
            check_permission(&claims, "get:movie"),
            Err(AuthError::Forbidden)
        );
    }
}
