use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated identity record handed over by the identity gate after sign-in.
///
/// Immutable once constructed; the session context only reads it. Serde
/// field names follow the identity provider's wire form so the record can
/// round-trip through the UI bridge unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    #[serde(rename = "name")]
    pub display_name: String,
    pub email: String,
    #[serde(rename = "picture")]
    pub avatar_url: String,
    #[serde(rename = "authenticatedAt")]
    pub authenticated_at: DateTime<Utc>,
}

impl AuthenticatedIdentity {
    pub fn new(
        display_name: impl Into<String>,
        email: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
            avatar_url: avatar_url.into(),
            authenticated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_provider_field_names() {
        let identity = AuthenticatedIdentity::new("Ada", "ada@example.com", "https://a/p.png");
        let json = serde_json::to_value(&identity).unwrap();

        assert_eq!(json["name"], "Ada");
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["picture"], "https://a/p.png");
        assert!(json.get("authenticatedAt").is_some());
    }
}
