//! Identifiers for effects, points and media objects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque string identity. Fresh ids are random v4 UUIDs; loaded ids keep
/// whatever string was saved.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    pub fn new() -> Self {
        Guid(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty guid marks an entity without identity.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Guid(s.to_string())
    }
}

impl From<String> for Guid {
    fn from(s: String) -> Self {
        Guid(s)
    }
}

impl AsRef<str> for Guid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_guids_are_distinct() {
        let a = Guid::new();
        let b = Guid::new();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn serializes_as_plain_string() {
        let g = Guid::from("fx-1");
        assert_eq!(serde_json::to_string(&g).unwrap(), "\"fx-1\"");
        assert!(Guid::default().is_empty());
    }
}
