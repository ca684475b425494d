//! User profiles linked to the external identity provider.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors for identity values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    /// The identity string was empty or whitespace.
    #[error("identity must not be blank")]
    Blank,
    /// The identity string carried surrounding whitespace.
    #[error("identity must not carry surrounding whitespace")]
    Padded,
}

/// Internal user identifier (UUID v4) owned by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque, stable identifier issued by the identity provider.
///
/// Votes reference voters by this value, never by [`UserId`].
///
/// # Examples
/// ```
/// use livepoll::domain::ExternalIdentity;
///
/// let identity = ExternalIdentity::new("user_2abc").expect("valid identity");
/// assert_eq!(identity.as_ref(), "user_2abc");
/// assert!(ExternalIdentity::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalIdentity(String);

impl ExternalIdentity {
    /// Validate and wrap an identity string.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(IdentityValidationError::Blank);
        }
        if raw.trim() != raw {
            return Err(IdentityValidationError::Padded);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for ExternalIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ExternalIdentity {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExternalIdentity> for String {
    fn from(value: ExternalIdentity) -> Self {
        value.0
    }
}

/// Identity claims forwarded by the identity provider for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable external identifier.
    pub external_id: ExternalIdentity,
    /// Primary email address, when shared by the provider.
    pub email: Option<String>,
    /// Display name, when shared by the provider.
    pub name: Option<String>,
}

impl Identity {
    /// Claims carrying only the external identifier.
    pub fn bare(external_id: ExternalIdentity) -> Self {
        Self {
            external_id,
            email: None,
            name: None,
        }
    }
}

/// Persisted user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Internal identifier.
    pub id: UserId,
    /// External identity; unique across users.
    pub external_id: ExternalIdentity,
    /// Email address, if known.
    pub email: Option<String>,
    /// Display name, if known.
    pub name: Option<String>,
}

impl User {
    /// Build a brand-new profile for first-time claims.
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            id: UserId::random(),
            external_id: identity.external_id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", IdentityValidationError::Blank)]
    #[case("   ", IdentityValidationError::Blank)]
    #[case(" user_1", IdentityValidationError::Padded)]
    fn rejects_malformed_identities(#[case] raw: &str, #[case] expected: IdentityValidationError) {
        assert_eq!(ExternalIdentity::new(raw), Err(expected));
    }

    #[rstest]
    fn identity_deserialises_through_validation() {
        let err = serde_json::from_str::<ExternalIdentity>("\"\"");
        assert!(err.is_err());
        let ok: ExternalIdentity = serde_json::from_str("\"user_9\"").expect("valid identity");
        assert_eq!(ok.as_ref(), "user_9");
    }

    #[rstest]
    fn from_identity_copies_claims() {
        let identity = Identity {
            external_id: ExternalIdentity::new("user_7").expect("identity"),
            email: Some("ada@example.com".into()),
            name: Some("Ada".into()),
        };
        let user = User::from_identity(&identity);
        assert_eq!(user.external_id, identity.external_id);
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert_eq!(user.name.as_deref(), Some("Ada"));
    }
}
