//! Agent slug identifier type.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Identifies an agent by its platform-wide slug.
///
/// Slugs are opaque, human-assigned identifiers (e.g. `billing-triage`).
/// They must be non-empty and carry no surrounding whitespace; no further
/// structure is assumed.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentSlug(String);

impl AgentSlug {
    /// Creates a slug after validating the supplied string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSlug`] when the value is empty or padded
    /// with whitespace.
    pub fn new(slug: impl Into<String>) -> Result<Self, Error> {
        let slug = slug.into();
        if slug.is_empty() {
            return Err(Error::InvalidSlug {
                slug,
                reason: "slug must not be empty",
            });
        }
        if slug.trim() != slug {
            return Err(Error::InvalidSlug {
                slug,
                reason: "slug must not contain leading or trailing whitespace",
            });
        }
        Ok(Self(slug))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AgentSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for AgentSlug {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl TryFrom<String> for AgentSlug {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AgentSlug> for String {
    fn from(value: AgentSlug) -> Self {
        value.0
    }
}

impl FromStr for AgentSlug {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl PartialEq<str> for AgentSlug {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for AgentSlug {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_slugs() {
        let slug = AgentSlug::new("billing-triage").expect("valid slug");
        assert_eq!(slug.as_str(), "billing-triage");
        assert_eq!(slug, "billing-triage");
    }

    #[test]
    fn rejects_empty_and_padded_slugs() {
        assert!(AgentSlug::new("").is_err());
        assert!(AgentSlug::new("  padded ").is_err());
    }

    #[test]
    fn round_trips_through_serde() {
        let slug = AgentSlug::new("router").expect("valid slug");
        let encoded = serde_json::to_string(&slug).expect("serialize");
        assert_eq!(encoded, "\"router\"");
        let decoded: AgentSlug = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(slug, decoded);
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<AgentSlug>("\"\"").is_err());
        assert!(serde_json::from_str::<AgentSlug>("\" x \"").is_err());
    }

    #[test]
    fn parses_from_str() {
        let slug: AgentSlug = "planner".parse().expect("parse");
        assert_eq!(slug.as_str(), "planner");
    }
}
