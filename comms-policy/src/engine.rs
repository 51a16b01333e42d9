//! The communication-governance decision engine.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::context::EvaluationContext;
use crate::decision::{Decision, MemoryAccess};
use crate::policy::Policy;
use crate::repository::PolicyRepository;
use crate::rules::{CommRule, parse_entries};

/// Errors surfaced by the governance engine.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy repository could not be queried.
    #[error("policy repository failure: {reason}")]
    Backend {
        /// Human-readable explanation for logging and operators.
        reason: String,
    },
}

/// Result alias for governance operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Behavior when the policy repository fetch fails.
///
/// The fetch is the evaluation's only I/O and it gates security-relevant
/// traffic, so the reaction to its failure is an explicit configuration
/// choice rather than an implicit default.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FetchFailurePolicy {
    /// Deny the call with an explanatory reason. The default: this gate
    /// protects inter-agent trust boundaries.
    #[default]
    FailClosed,
    /// Proceed with the default-open decision as if no policies existed.
    FailOpen,
    /// Surface the [`PolicyError`] to the caller and let it decide.
    Propagate,
}

/// Decides whether one agent may call another and under what restrictions.
///
/// The engine holds no mutable state; [`GovernanceEngine::evaluate`] takes
/// `&self` and is safe to call concurrently across unrelated runs. Callers
/// own the live counters and invoke the engine once per proposed hop.
#[derive(Clone)]
pub struct GovernanceEngine<R>
where
    R: PolicyRepository + 'static,
{
    repository: Arc<R>,
    fetch_failure: FetchFailurePolicy,
}

impl<R> GovernanceEngine<R>
where
    R: PolicyRepository + 'static,
{
    /// Creates an engine backed by the supplied repository, failing closed
    /// on repository errors.
    #[must_use]
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            fetch_failure: FetchFailurePolicy::default(),
        }
    }

    /// Overrides the reaction to repository fetch failures.
    #[must_use]
    pub fn with_fetch_failure_policy(mut self, policy: FetchFailurePolicy) -> Self {
        self.fetch_failure = policy;
        self
    }

    /// Evaluates one proposed agent-to-agent call.
    ///
    /// Builds the scope filters, fetches matching policies, folds their
    /// rules broadest scope first into a monotonic decision, then applies
    /// the caller-supplied live counters against the derived ceilings.
    ///
    /// When only the mandatory agent scope is derivable the repository is
    /// not queried at all and the default-open decision is returned.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Backend`] only when the repository fetch
    /// fails and the engine is configured with
    /// [`FetchFailurePolicy::Propagate`].
    pub async fn evaluate(&self, context: &EvaluationContext) -> PolicyResult<Decision> {
        let filters = context.scope_filters();
        if filters.len() <= 1 {
            debug!(
                from = %context.from_agent(),
                to = %context.to_agent(),
                "no scoping context beyond the caller; default-open fast path"
            );
            return Ok(Decision::default_open());
        }

        let policies = match self.repository.find_policies(&filters).await {
            Ok(policies) => policies,
            Err(error) => return self.on_fetch_failure(error),
        };
        if policies.is_empty() {
            debug!(
                from = %context.from_agent(),
                to = %context.to_agent(),
                "no enabled policies match; default-open"
            );
            return Ok(Decision::default_open());
        }

        let mut decision = Decision::default_open();
        for policy in rank_policies(policies) {
            apply_policy(&mut decision, &policy, context);
        }
        apply_runtime_counters(&mut decision, context);

        if !decision.allowed() {
            debug!(
                from = %context.from_agent(),
                to = %context.to_agent(),
                reason = decision.reason().unwrap_or("unspecified"),
                "call denied"
            );
        }
        Ok(decision)
    }

    fn on_fetch_failure(&self, error: PolicyError) -> PolicyResult<Decision> {
        warn!(%error, policy = ?self.fetch_failure, "policy repository fetch failed");
        match self.fetch_failure {
            FetchFailurePolicy::FailClosed => {
                let mut decision = Decision::default_open();
                decision.deny(format!("policy lookup failed, failing closed: {error}"));
                Ok(decision)
            }
            FetchFailurePolicy::FailOpen => Ok(Decision::default_open()),
            FetchFailurePolicy::Propagate => Err(error),
        }
    }
}

/// Orders policies by scope breadth, then declared priority within equal
/// scope. The sort is stable, so repository order breaks remaining ties.
/// Processing order decides which deny reason survives; the numeric
/// ceilings are order-independent minima.
fn rank_policies(mut policies: Vec<Policy>) -> Vec<Policy> {
    policies.sort_by_key(|policy| (policy.scope().breadth_rank(), policy.priority()));
    policies
}

/// Folds one policy's rules into the decision. The policy is recorded as
/// applied iff at least one rule matched its trigger condition.
fn apply_policy(decision: &mut Decision, policy: &Policy, context: &EvaluationContext) {
    let mut matched_any = false;
    for rule in parse_entries(policy.rules()) {
        if apply_rule(decision, &rule, context) {
            debug!(policy = %policy.id(), scope = %policy.scope(), "rule matched");
            matched_any = true;
        }
    }
    if matched_any {
        decision.record_policy(policy.id());
    }
}

/// Applies a single rule, returning whether its trigger condition matched.
/// Rules never short-circuit: denials do not stop later rules from
/// tightening ceilings or overwriting the reason.
fn apply_rule(decision: &mut Decision, rule: &CommRule, context: &EvaluationContext) -> bool {
    let from = context.from_agent();
    let to = context.to_agent();
    match rule {
        CommRule::DenyAll { reason } => {
            decision.deny(reason.clone().unwrap_or_else(|| {
                "all agent-to-agent communication is denied by policy".to_owned()
            }));
            true
        }
        CommRule::DenyPair { from: f, to: t, reason } => {
            if f == from && t == to {
                decision.deny(reason.clone().unwrap_or_else(|| {
                    format!("communication from `{from}` to `{to}` is denied by policy")
                }));
                true
            } else {
                false
            }
        }
        CommRule::DenyOutbound { agent_slug, reason } => {
            if agent_slug == from {
                decision.deny(reason.clone().unwrap_or_else(|| {
                    format!("outbound communication from `{from}` is denied by policy")
                }));
                true
            } else {
                false
            }
        }
        CommRule::DenyInbound { agent_slug, reason } => {
            if agent_slug == to {
                decision.deny(reason.clone().unwrap_or_else(|| {
                    format!("inbound communication to `{to}` is denied by policy")
                }));
                true
            } else {
                false
            }
        }
        CommRule::AllowedAgentsOnly { agent_slugs } => {
            if agent_slugs.contains(to) {
                false
            } else {
                decision.deny(format!("agent `{to}` is not in the allowed agents list"));
                true
            }
        }
        CommRule::MaxPeerCalls { limit } => {
            decision.narrow_max_peer_calls(*limit);
            true
        }
        CommRule::MaxDepth { limit } => {
            decision.narrow_max_depth(*limit);
            true
        }
        CommRule::RequireApproval { agent_slugs } => {
            if agent_slugs.contains(from) || agent_slugs.contains(to) {
                decision.require_approval();
                true
            } else {
                false
            }
        }
        CommRule::MemoryAccess { agent_slug, access } => {
            if agent_slug == from || agent_slug == to {
                decision.restrict_memory(MemoryAccess::from(*access));
                true
            } else {
                false
            }
        }
    }
}

/// Gates the statically derived ceilings against the caller's live
/// counters. Runs only while the decision is still allowed, so a static
/// denial's reason is never overwritten; depth is checked before peers.
fn apply_runtime_counters(decision: &mut Decision, context: &EvaluationContext) {
    if !decision.allowed() {
        return;
    }
    let max_depth = decision.restrictions().max_depth();
    if let Some(depth) = context.current_depth() {
        if depth >= max_depth {
            decision.deny(format!("Maximum invocation depth ({max_depth}) exceeded"));
            return;
        }
    }
    let max_peer_calls = decision.restrictions().max_peer_calls();
    if let Some(peer_calls) = context.current_peer_calls() {
        if peer_calls >= max_peer_calls {
            decision.deny(format!("Maximum peer calls ({max_peer_calls}) exceeded"));
        }
    }
}
