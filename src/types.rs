//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: UUID-based unique connection identifier
//! - `LoginId`: validated login name announced to other clients

use uuid::Uuid;

/// Unique client identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe client identification.
/// Implements Hash and Eq for use as HashMap keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Login name chosen by a client
///
/// Set once per connection; broadcast in logon/logoff notices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoginId(String);

impl LoginId {
    /// Parse a login id from raw input
    ///
    /// Leading/trailing whitespace is trimmed; empty names and names with
    /// embedded whitespace are rejected.
    pub fn new(raw: &str) -> Option<Self> {
        let name = raw.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            None
        } else {
            Some(Self(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LoginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_unique() {
        let id1 = ClientId::new();
        let id2 = ClientId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_login_id_trims_whitespace() {
        let login = LoginId::new("  alice  ").unwrap();
        assert_eq!(login.as_str(), "alice");
    }

    #[test]
    fn test_login_id_rejects_bad_names() {
        assert!(LoginId::new("").is_none());
        assert!(LoginId::new("   ").is_none());
        assert!(LoginId::new("two words").is_none());
    }
}
