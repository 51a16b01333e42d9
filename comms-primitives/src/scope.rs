//! Policy scope levels and repository query filters.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Level at which a communication policy binds.
///
/// Scopes form a fixed breadth ordering used by the ranker: broader scopes
/// are processed first so narrower ones can further tighten the outcome.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScope {
    /// Applies to every agent in an organization.
    Organization,
    /// Applies to every agent in a workspace.
    Workspace,
    /// Applies to every agent in an agent network.
    Network,
    /// Applies to a single agent, keyed by its slug.
    Agent,
    /// Applies to the calls a specific user's sessions trigger.
    User,
}

impl PolicyScope {
    /// Returns the fixed breadth rank: broader scopes rank lower and are
    /// evaluated first (`organization` 0 through `user` 4).
    #[must_use]
    pub const fn breadth_rank(self) -> u8 {
        match self {
            Self::Organization => 0,
            Self::Workspace => 1,
            Self::Network => 2,
            Self::Agent => 3,
            Self::User => 4,
        }
    }

    /// Returns the scope's canonical lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Workspace => "workspace",
            Self::Network => "network",
            Self::Agent => "agent",
            Self::User => "user",
        }
    }
}

impl Display for PolicyScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(scope, scope_id)` pair used to query the policy repository.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct ScopeFilter {
    scope: PolicyScope,
    scope_id: String,
}

impl ScopeFilter {
    /// Creates a filter after validating the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScopeId`] when the identifier is empty or
    /// whitespace-only.
    pub fn new(scope: PolicyScope, scope_id: impl Into<String>) -> Result<Self, Error> {
        let scope_id = scope_id.into();
        if scope_id.trim().is_empty() {
            return Err(Error::InvalidScopeId {
                scope: scope.to_string(),
                reason: "scope id must not be empty",
            });
        }
        Ok(Self { scope, scope_id })
    }

    /// Returns the scope level this filter targets.
    #[must_use]
    pub fn scope(&self) -> PolicyScope {
        self.scope
    }

    /// Returns the identifier of the entity the scope binds to.
    #[must_use]
    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breadth_ranks_are_ordered_broad_to_narrow() {
        let ranks: Vec<u8> = [
            PolicyScope::Organization,
            PolicyScope::Workspace,
            PolicyScope::Network,
            PolicyScope::Agent,
            PolicyScope::User,
        ]
        .iter()
        .map(|scope| scope.breadth_rank())
        .collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn scope_serializes_as_snake_case() {
        let encoded = serde_json::to_string(&PolicyScope::Organization).expect("serialize");
        assert_eq!(encoded, "\"organization\"");
    }

    #[test]
    fn filter_rejects_blank_ids() {
        assert!(ScopeFilter::new(PolicyScope::Workspace, "  ").is_err());
        let filter = ScopeFilter::new(PolicyScope::Agent, "router").expect("valid filter");
        assert_eq!(filter.scope(), PolicyScope::Agent);
        assert_eq!(filter.scope_id(), "router");
    }
}
