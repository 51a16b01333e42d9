//! Communication governance for agent-to-agent calls.
//!
//! Given a proposed call between two agents, the engine decides whether the
//! call may proceed and which restrictions apply (recursion depth, peer-call
//! ceiling, memory sharing, human approval). Policies are fetched once per
//! evaluation from a [`PolicyRepository`], ranked broadest scope first, and
//! folded rule by rule into a monotonic [`Decision`]: restrictions only
//! ever tighten, never loosen, within one evaluation.
//!
//! The engine reads policies and returns a decision; it does not execute
//! agents, mutate invocation counters, or persist anything. Callers invoke
//! [`GovernanceEngine::evaluate`] immediately before dispatching each
//! agent-to-agent hop.

#![warn(missing_docs, clippy::pedantic)]

mod context;
mod decision;
mod engine;
mod policy;
mod repository;
mod rules;

/// Inputs describing one proposed agent-to-agent call.
pub use context::EvaluationContext;
/// Decision lattice: outcome, restrictions, and defaults.
pub use decision::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_PEER_CALLS, Decision, MemoryAccess, Restrictions,
};
/// The decision engine, its errors, and the fetch-failure configuration.
pub use engine::{FetchFailurePolicy, GovernanceEngine, PolicyError, PolicyResult};
/// Scoped policy records and their builder.
pub use policy::{Policy, PolicyBuilder};
/// Repository boundary and the in-memory implementation.
pub use repository::{InMemoryPolicyRepository, PolicyRepository};
/// Typed communication rules and the schemaless parse boundary.
pub use rules::{CommRule, MemoryRestriction, parse_entries};
