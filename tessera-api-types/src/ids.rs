use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unified ID type used at the API boundary
///
/// Stored entities are keyed by [`Uuid`], but path parameters and request
/// bodies arrive as strings. `ApiId` keeps the string form and parses on
/// demand so handlers can report a bad id instead of panicking on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApiId(pub String);

impl ApiId {
    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// Create from a string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get as string (always available)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Try to parse as UUID
    pub fn as_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.0).ok()
    }
}

impl std::fmt::Display for ApiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ApiId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl From<String> for ApiId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ApiId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
