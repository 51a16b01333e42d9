//! Evaluation context for a proposed agent-to-agent call.

use comms_primitives::{AgentSlug, PolicyScope, ScopeFilter};
use serde::{Deserialize, Serialize};

/// Inputs for evaluating one proposed call.
///
/// The orchestration runtime owns `current_depth` and `current_peer_calls`
/// and passes the live values for the invocation chain it is tracking; the
/// engine only compares them against the statically derived limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationContext {
    from_agent: AgentSlug,
    to_agent: AgentSlug,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    network_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_peer_calls: Option<u32>,
}

impl EvaluationContext {
    /// Creates a context for a call from `from_agent` to `to_agent`.
    #[must_use]
    pub fn new(from_agent: AgentSlug, to_agent: AgentSlug) -> Self {
        Self {
            from_agent,
            to_agent,
            organization_id: None,
            workspace_id: None,
            network_id: None,
            user_id: None,
            session_id: None,
            current_depth: None,
            current_peer_calls: None,
        }
    }

    /// Sets the organization the call happens within.
    #[must_use]
    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Sets the workspace the call happens within.
    #[must_use]
    pub fn with_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }

    /// Sets the agent network the call happens within.
    #[must_use]
    pub fn with_network(mut self, network_id: impl Into<String>) -> Self {
        self.network_id = Some(network_id.into());
        self
    }

    /// Sets the user whose session triggered the call.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the session identifier, carried for caller-side correlation.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Supplies the live recursion depth for the invocation chain.
    #[must_use]
    pub fn with_current_depth(mut self, depth: u32) -> Self {
        self.current_depth = Some(depth);
        self
    }

    /// Supplies the live peer-call count for the invocation chain.
    #[must_use]
    pub fn with_current_peer_calls(mut self, peer_calls: u32) -> Self {
        self.current_peer_calls = Some(peer_calls);
        self
    }

    /// Returns the calling agent's slug.
    #[must_use]
    pub fn from_agent(&self) -> &AgentSlug {
        &self.from_agent
    }

    /// Returns the target agent's slug.
    #[must_use]
    pub fn to_agent(&self) -> &AgentSlug {
        &self.to_agent
    }

    /// Returns the session identifier, when supplied.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns the live recursion depth, when supplied.
    #[must_use]
    pub fn current_depth(&self) -> Option<u32> {
        self.current_depth
    }

    /// Returns the live peer-call count, when supplied.
    #[must_use]
    pub fn current_peer_calls(&self) -> Option<u32> {
        self.current_peer_calls
    }

    /// Derives the ordered scope filters relevant to this call.
    ///
    /// Organization, workspace, network, and user filters are included for
    /// each identifier that is present (blank identifiers are omitted, not
    /// errors), followed by the mandatory agent filter. The agent filter
    /// binds to the *calling* agent only: an agent's own agent-scope policy
    /// governs its outbound calls, while inbound protection comes from
    /// broader scopes or explicit `deny_inbound`/`allowed_agents_only`
    /// rules that name it.
    #[must_use]
    pub fn scope_filters(&self) -> Vec<ScopeFilter> {
        let mut filters = Vec::with_capacity(5);
        let optional = [
            (PolicyScope::Organization, self.organization_id.as_deref()),
            (PolicyScope::Workspace, self.workspace_id.as_deref()),
            (PolicyScope::Network, self.network_id.as_deref()),
            (PolicyScope::User, self.user_id.as_deref()),
        ];
        for (scope, id) in optional {
            if let Some(id) = id {
                if let Ok(filter) = ScopeFilter::new(scope, id) {
                    filters.push(filter);
                }
            }
        }
        if let Ok(filter) = ScopeFilter::new(PolicyScope::Agent, self.from_agent.as_str()) {
            filters.push(filter);
        }
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(s: &str) -> AgentSlug {
        AgentSlug::new(s).expect("valid slug")
    }

    #[test]
    fn bare_context_yields_only_the_agent_filter() {
        let ctx = EvaluationContext::new(slug("planner"), slug("coder"));
        let filters = ctx.scope_filters();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].scope(), PolicyScope::Agent);
        assert_eq!(filters[0].scope_id(), "planner");
    }

    #[test]
    fn filters_follow_declared_order() {
        let ctx = EvaluationContext::new(slug("planner"), slug("coder"))
            .with_organization("org1")
            .with_workspace("ws1")
            .with_network("net1")
            .with_user("user1");
        let scopes: Vec<PolicyScope> = ctx.scope_filters().iter().map(ScopeFilter::scope).collect();
        assert_eq!(
            scopes,
            vec![
                PolicyScope::Organization,
                PolicyScope::Workspace,
                PolicyScope::Network,
                PolicyScope::User,
                PolicyScope::Agent,
            ]
        );
    }

    #[test]
    fn blank_scope_ids_are_omitted() {
        let ctx = EvaluationContext::new(slug("planner"), slug("coder"))
            .with_organization("  ")
            .with_network("net1");
        let filters = ctx.scope_filters();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].scope(), PolicyScope::Network);
        assert_eq!(filters[1].scope(), PolicyScope::Agent);
    }

    #[test]
    fn agent_filter_binds_to_the_caller() {
        let ctx = EvaluationContext::new(slug("planner"), slug("coder")).with_organization("org1");
        let filters = ctx.scope_filters();
        let agent = filters
            .iter()
            .find(|f| f.scope() == PolicyScope::Agent)
            .expect("agent filter present");
        assert_eq!(agent.scope_id(), "planner");
    }
}
