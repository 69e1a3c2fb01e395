//! User identity types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a signed-in user, assigned by the identity
/// provider. Scopes every store operation to one task collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wraps a provider-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh random identifier (used by the in-memory provider).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Provider-issued identifier.
    pub id: UserId,
    /// Sign-in email, shown in greetings.
    pub email: String,
}

impl UserProfile {
    /// Builds a profile with a freshly minted id for the given email.
    #[must_use]
    pub fn with_generated_id(email: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            email: email.into(),
        }
    }
}
