//! Newtype wrappers for type safety

use serde::{Deserialize, Serialize};

use crate::error::{HeadlessError, Result};
use crate::message::identity::is_canonical_uuid;

/// Opaque session identity assigned by the external CLI
///
/// Always holds text in canonical 8-4-4-4-12 UUID form. The text is kept
/// exactly as the CLI reported it (including letter case) so it can be handed
/// back to the same CLI on resume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Parse a caller-supplied session id
    ///
    /// # Errors
    /// Returns `HeadlessError::InvalidSessionId` unless `text` is a canonical UUID
    pub fn parse(text: &str) -> Result<Self> {
        if is_canonical_uuid(text) {
            Ok(Self(text.to_string()))
        } else {
            Err(HeadlessError::invalid_session_id(
                "Invalid session ID format (must be a valid UUID)",
            ))
        }
    }

    /// Wrap text already matched against the UUID pattern
    pub(crate) fn from_match(text: &str) -> Self {
        Self(text.to_string())
    }

    /// Get the session ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = HeadlessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
