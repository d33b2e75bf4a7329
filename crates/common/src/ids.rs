//! Type-safe identifier newtypes for certdedup.
//!
//! A bundle is addressed by the name of the directory that holds it inside
//! the live directory (for Let's Encrypt layouts, the certificate name).
//! Keeping that name in a newtype stops raw list-file lines from being joined
//! onto filesystem paths before they were checked.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};
use thiserror::Error;

/// Rejected bundle identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBundleId {
    #[error("bundle identifier is empty")]
    Empty,

    #[error("bundle identifier '{0}' is not a single directory name")]
    NotAComponent(String),
}

/// Bundle identifier.
///
/// Always a single, normal path component: never empty, never `.` or `..`,
/// never containing a path separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BundleId(String);

impl BundleId {
    /// Validate and wrap an identifier
    pub fn parse(id: impl Into<String>) -> Result<Self, InvalidBundleId> {
        let id = id.into();
        if id.is_empty() {
            return Err(InvalidBundleId::Empty);
        }

        let mut components = Path::new(&id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == id.as_str() => Ok(Self(id)),
            _ => Err(InvalidBundleId::NotAComponent(id)),
        }
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BundleId {
    type Error = InvalidBundleId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for BundleId {
    type Error = InvalidBundleId;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<BundleId> for String {
    fn from(id: BundleId) -> Self {
        id.0
    }
}

impl AsRef<Path> for BundleId {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_id_accepts_domain_names() {
        let id = BundleId::parse("example.com").unwrap();
        assert_eq!(id.as_str(), "example.com");
        assert_eq!(id.to_string(), "example.com");

        let wildcard = BundleId::parse("example.com-0001").unwrap();
        assert_eq!(wildcard.into_string(), "example.com-0001");
    }

    #[test]
    fn test_bundle_id_rejects_empty() {
        assert_eq!(BundleId::parse(""), Err(InvalidBundleId::Empty));
    }

    #[test]
    fn test_bundle_id_rejects_traversal() {
        for bad in ["..", ".", "../etc", "a/b", "/etc/passwd", "a/", "./a"] {
            assert!(
                matches!(BundleId::parse(bad), Err(InvalidBundleId::NotAComponent(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_bundle_id_ordering() {
        let mut ids = vec![
            BundleId::parse("b.com").unwrap(),
            BundleId::parse("a.com").unwrap(),
        ];
        ids.sort();
        assert_eq!(ids[0].as_str(), "a.com");
    }

    #[test]
    fn test_bundle_id_serde() {
        let id: BundleId = serde_json::from_str("\"example.com\"").unwrap();
        assert_eq!(id.as_str(), "example.com");
        assert!(serde_json::from_str::<BundleId>("\"../x\"").is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"example.com\"");
    }
}
