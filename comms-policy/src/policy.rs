//! Scoped policy records as persisted by the platform.

use comms_primitives::{PolicyScope, ScopeFilter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::rules::CommRule;

/// A named, scoped bundle of communication rules.
///
/// The rule payload stays schemaless ([`Value`]) here, exactly as it comes
/// out of the store; typing happens at the engine's parse boundary
/// ([`crate::parse_entries`]). Administrators author these records
/// outside this crate; the engine only reads them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    id: Uuid,
    scope: PolicyScope,
    scope_id: String,
    #[serde(default)]
    priority: i32,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    rules: Vec<Value>,
}

fn default_enabled() -> bool {
    true
}

impl Policy {
    /// Starts building a policy bound to `scope_id` at the given scope.
    #[must_use]
    pub fn builder(scope: PolicyScope, scope_id: impl Into<String>) -> PolicyBuilder {
        PolicyBuilder {
            id: Uuid::new_v4(),
            scope,
            scope_id: scope_id.into(),
            priority: 0,
            enabled: true,
            rules: Vec::new(),
        }
    }

    /// Returns the policy's unique identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the scope level the policy binds at.
    #[must_use]
    pub fn scope(&self) -> PolicyScope {
        self.scope
    }

    /// Returns the identifier of the entity the policy binds to.
    #[must_use]
    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// Returns the declared priority; lower values evaluate first within
    /// the same scope.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns whether the policy participates in evaluations.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the raw, schemaless rule payload in declared order.
    #[must_use]
    pub fn rules(&self) -> &[Value] {
        &self.rules
    }

    /// Returns true when this policy binds to the filter's entity.
    #[must_use]
    pub fn matches_filter(&self, filter: &ScopeFilter) -> bool {
        self.scope == filter.scope() && self.scope_id == filter.scope_id()
    }
}

/// Builder for [`Policy`] records, used by tests and embedders.
#[derive(Debug)]
pub struct PolicyBuilder {
    id: Uuid,
    scope: PolicyScope,
    scope_id: String,
    priority: i32,
    enabled: bool,
    rules: Vec<Value>,
}

impl PolicyBuilder {
    /// Overrides the generated identifier.
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Sets the evaluation priority within the policy's scope.
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Marks the policy as disabled; the repository must not return it.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Appends a typed rule, serialized into the raw payload.
    #[must_use]
    pub fn rule(mut self, rule: &CommRule) -> Self {
        let value = serde_json::to_value(rule).unwrap_or(Value::Null);
        self.rules.push(value);
        self
    }

    /// Appends a raw rule entry as stored, bypassing typing entirely.
    #[must_use]
    pub fn raw_rule(mut self, entry: Value) -> Self {
        self.rules.push(entry);
        self
    }

    /// Finalizes the record.
    #[must_use]
    pub fn build(self) -> Policy {
        Policy {
            id: self.id,
            scope: self.scope,
            scope_id: self.scope_id,
            priority: self.priority,
            enabled: self.enabled,
            rules: self.rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_serializes_typed_rules() {
        let policy = Policy::builder(PolicyScope::Workspace, "ws1")
            .priority(5)
            .rule(&CommRule::MaxDepth { limit: 3 })
            .build();
        assert_eq!(policy.scope(), PolicyScope::Workspace);
        assert_eq!(policy.priority(), 5);
        assert!(policy.enabled());
        assert_eq!(policy.rules().len(), 1);
        assert_eq!(policy.rules()[0]["type"], "max_depth");
    }

    #[test]
    fn filter_matching_requires_scope_and_id() {
        let policy = Policy::builder(PolicyScope::Agent, "planner").build();
        let same = ScopeFilter::new(PolicyScope::Agent, "planner").expect("filter");
        let other_id = ScopeFilter::new(PolicyScope::Agent, "coder").expect("filter");
        let other_scope = ScopeFilter::new(PolicyScope::User, "planner").expect("filter");
        assert!(policy.matches_filter(&same));
        assert!(!policy.matches_filter(&other_id));
        assert!(!policy.matches_filter(&other_scope));
    }

    #[test]
    fn deserialization_defaults_enabled_and_priority() {
        let policy: Policy = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "scope": "organization",
            "scope_id": "org1",
        }))
        .expect("deserialize");
        assert!(policy.enabled());
        assert_eq!(policy.priority(), 0);
        assert!(policy.rules().is_empty());
    }
}
