//! JWT claims structure.
//!
//! Contains the claims extracted from validated JWTs. The `sub` field is
//! redacted in Debug output to prevent exposure in logs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Audience claim, which issuers encode either as a single string or as
/// an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    /// Check whether the audience claim includes the given value.
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == audience,
            Audience::Multiple(auds) => auds.iter().any(|a| a == audience),
        }
    }
}

/// JWT claims for verified tokens.
///
/// The `permissions` claim is deliberately typed as `Option<Vec<String>>`:
/// a token whose `permissions` field has any other shape fails to decode,
/// so a type-confused permission list never reaches the permission check.
///
/// The `sub` field contains user or client identifiers which should not
/// be exposed in logs. A custom Debug implementation redacts this field.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer.
    pub iss: String,

    /// Subject (user or client identifier) - redacted in Debug output.
    pub sub: String,

    /// Audience the token was issued for.
    pub aud: Audience,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Permission tags granted to this token (e.g. `post:movies`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("iss", &self.iss)
            .field("sub", &"[REDACTED]")
            .field("aud", &self.aud)
            .field("exp", &self.exp)
            .field("permissions", &self.permissions)
            .finish()
    }
}

impl Claims {
    /// Check if the token carries a specific permission.
    ///
    /// A token without a `permissions` claim carries no permissions.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_deref()
            .is_some_and(|perms| perms.iter().any(|p| p == permission))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn claims_with_permissions(permissions: Option<Vec<String>>) -> Claims {
        Claims {
            iss: "https://casting-agency.test/".to_string(),
            sub: "auth0|secret-user-id".to_string(),
            aud: Audience::Single("casting".to_string()),
            exp: 1234567890,
            permissions,
        }
    }

    #[test]
    fn test_claims_debug_redacts_sub() {
        let claims = claims_with_permissions(Some(vec!["get:movies".to_string()]));

        let debug_str = format!("{:?}", claims);

        assert!(
            !debug_str.contains("secret-user-id"),
            "Debug output should not contain actual sub value"
        );
        assert!(
            debug_str.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
    }

    #[test]
    fn test_has_permission() {
        let claims = claims_with_permissions(Some(vec![
            "get:movies".to_string(),
            "post:actors".to_string(),
        ]));

        assert!(claims.has_permission("get:movies"));
        assert!(claims.has_permission("post:actors"));
        assert!(!claims.has_permission("delete:movies"));
        assert!(!claims.has_permission("get:movie")); // Partial match should not work
    }

    #[test]
    fn test_has_permission_without_claim() {
        let claims = claims_with_permissions(None);
        assert!(!claims.has_permission("get:movies"));
    }

    #[test]
    fn test_audience_single_contains() {
        let aud = Audience::Single("casting".to_string());
        assert!(aud.contains("casting"));
        assert!(!aud.contains("other"));
    }

    #[test]
    fn test_audience_multiple_contains() {
        let aud = Audience::Multiple(vec!["casting".to_string(), "reporting".to_string()]);
        assert!(aud.contains("casting"));
        assert!(aud.contains("reporting"));
        assert!(!aud.contains("admin"));
    }

    #[test]
    fn test_deserialize_audience_string_or_array() {
        let single: Claims = serde_json::from_str(
            r#"{"iss":"i","sub":"s","aud":"casting","exp":1}"#,
        )
        .unwrap();
        assert_eq!(single.aud, Audience::Single("casting".to_string()));

        let multiple: Claims = serde_json::from_str(
            r#"{"iss":"i","sub":"s","aud":["casting","other"],"exp":1}"#,
        )
        .unwrap();
        assert!(multiple.aud.contains("other"));
    }

    #[test]
    fn test_deserialize_missing_permissions_is_none() {
        let claims: Claims =
            serde_json::from_str(r#"{"iss":"i","sub":"s","aud":"casting","exp":1}"#).unwrap();
        assert!(claims.permissions.is_none());
    }

    #[test]
    fn test_deserialize_rejects_non_list_permissions() {
        // Fail closed: a permissions claim that is not a list of strings
        // must not decode into a claim set at all.
        let result = serde_json::from_str::<Claims>(
            r#"{"iss":"i","sub":"s","aud":"casting","exp":1,"permissions":"get:movies"}"#,
        );
        assert!(result.is_err());

        let result = serde_json::from_str::<Claims>(
            r#"{"iss":"i","sub":"s","aud":"casting","exp":1,"permissions":[1,2,3]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_claims_serialization_omits_missing_permissions() {
        let claims = claims_with_permissions(None);
        let json = serde_json::to_string(&claims).unwrap();
        assert!(
            !json.contains("permissions"),
            "permissions should be omitted when None"
        );
    }
}
