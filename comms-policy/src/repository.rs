//! Policy repository boundary and the in-memory implementation.

use std::sync::RwLock;

use async_trait::async_trait;
use comms_primitives::ScopeFilter;

use crate::engine::PolicyResult;
use crate::policy::Policy;

/// Trait implemented by policy stores.
///
/// This is the evaluation's single suspension point. Implementations must
/// return only enabled policies whose `(scope, scope_id)` matches **any**
/// supplied filter, with their full rule payloads. Fetch failures surface
/// as [`crate::PolicyError::Backend`]; how the engine reacts is governed by
/// its [`crate::FetchFailurePolicy`].
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Returns all enabled policies matching any of the filters.
    async fn find_policies(&self, filters: &[ScopeFilter]) -> PolicyResult<Vec<Policy>>;
}

/// In-memory policy store for tests and single-process embedders.
#[derive(Debug, Default)]
pub struct InMemoryPolicyRepository {
    policies: RwLock<Vec<Policy>>,
}

impl InMemoryPolicyRepository {
    /// Constructs an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a policy in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal policy store lock has been poisoned.
    pub fn add_policy(&self, policy: Policy) {
        let mut guard = self.policies.write().expect("policy store poisoned");
        guard.push(policy);
    }
}

#[async_trait]
impl PolicyRepository for InMemoryPolicyRepository {
    async fn find_policies(&self, filters: &[ScopeFilter]) -> PolicyResult<Vec<Policy>> {
        let guard = self.policies.read().expect("policy store poisoned");
        Ok(guard
            .iter()
            .filter(|policy| {
                policy.enabled() && filters.iter().any(|filter| policy.matches_filter(filter))
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comms_primitives::PolicyScope;

    #[tokio::test]
    async fn filters_apply_or_semantics() {
        let store = InMemoryPolicyRepository::new();
        store.add_policy(Policy::builder(PolicyScope::Organization, "org1").build());
        store.add_policy(Policy::builder(PolicyScope::Workspace, "ws1").build());
        store.add_policy(Policy::builder(PolicyScope::Workspace, "ws2").build());

        let filters = vec![
            ScopeFilter::new(PolicyScope::Organization, "org1").expect("filter"),
            ScopeFilter::new(PolicyScope::Workspace, "ws2").expect("filter"),
        ];
        let found = store.find_policies(&filters).await.expect("fetch");
        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|p| p.scope_id() == "org1"));
        assert!(found.iter().any(|p| p.scope_id() == "ws2"));
    }

    #[tokio::test]
    async fn disabled_policies_are_never_returned() {
        let store = InMemoryPolicyRepository::new();
        store.add_policy(
            Policy::builder(PolicyScope::Agent, "planner")
                .disabled()
                .build(),
        );

        let filters = vec![ScopeFilter::new(PolicyScope::Agent, "planner").expect("filter")];
        let found = store.find_policies(&filters).await.expect("fetch");
        assert!(found.is_empty());
    }
}
