//! Typed communication rules and the schemaless parse boundary.
//!
//! Rule payloads arrive as loosely-typed JSON from the policy store. The
//! fold never sees raw values: [`parse_entries`] tags each entry into a
//! [`CommRule`] variant at the boundary and drops anything it cannot
//! recognize as a no-op.

use comms_primitives::AgentSlug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Memory-sharing level a `memory_access` rule may impose.
///
/// Rules can only restrict; the unrestricted `full` level exists solely on
/// the decision side ([`crate::MemoryAccess`]).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryRestriction {
    /// The matched agent may only read shared memory.
    ReadOnly,
    /// The matched agent gets no shared-memory access at all.
    None,
}

/// A single communication rule inside a policy.
///
/// The enum is exhaustive over every rule type the platform stores; adding
/// a variant forces every match site to be revisited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommRule {
    /// Unconditionally denies the call.
    DenyAll {
        /// Optional operator-facing explanation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Denies the call when both endpoints match exactly.
    DenyPair {
        /// Calling agent the rule targets.
        from: AgentSlug,
        /// Target agent the rule targets.
        to: AgentSlug,
        /// Optional operator-facing explanation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Denies any call originating from the named agent.
    DenyOutbound {
        /// Agent whose outbound calls are blocked.
        agent_slug: AgentSlug,
        /// Optional operator-facing explanation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Denies any call targeting the named agent.
    DenyInbound {
        /// Agent whose inbound calls are blocked.
        agent_slug: AgentSlug,
        /// Optional operator-facing explanation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Denies the call unless the target agent is in the allow list.
    AllowedAgentsOnly {
        /// Agents the caller is permitted to reach.
        agent_slugs: Vec<AgentSlug>,
    },
    /// Narrows the effective peer-call ceiling.
    MaxPeerCalls {
        /// New ceiling; only applied when lower than the current one.
        limit: u32,
    },
    /// Narrows the effective recursion-depth ceiling.
    MaxDepth {
        /// New ceiling; only applied when lower than the current one.
        limit: u32,
    },
    /// Requires human approval when either endpoint is listed.
    RequireApproval {
        /// Agents whose calls need human sign-off.
        agent_slugs: Vec<AgentSlug>,
    },
    /// Ratchets the memory-sharing level down for calls touching the agent.
    MemoryAccess {
        /// Agent the restriction is keyed on (either endpoint matches).
        agent_slug: AgentSlug,
        /// Level to ratchet down to.
        access: MemoryRestriction,
    },
}

/// Parses raw stored rule entries into typed rules.
///
/// Entries that do not deserialize as a known tagged shape (unknown tag,
/// missing fields, invalid slugs) are skipped with a `debug!` log. A
/// malformed entry never fails its policy or the evaluation.
#[must_use]
pub fn parse_entries(entries: &[Value]) -> Vec<CommRule> {
    let mut rules = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<CommRule>(entry.clone()) {
            Ok(rule) => rules.push(rule),
            Err(error) => {
                debug!(%error, entry = %entry, "skipping unrecognized rule entry");
            }
        }
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_tags() {
        let entries = vec![
            json!({"type": "deny_all", "reason": "lockdown"}),
            json!({"type": "deny_pair", "from": "a", "to": "b"}),
            json!({"type": "max_depth", "limit": 3}),
            json!({"type": "memory_access", "agent_slug": "a", "access": "none"}),
        ];
        let rules = parse_entries(&entries);
        assert_eq!(rules.len(), 4);
        assert_eq!(
            rules[0],
            CommRule::DenyAll {
                reason: Some("lockdown".into())
            }
        );
        assert_eq!(rules[2], CommRule::MaxDepth { limit: 3 });
    }

    #[test]
    fn unknown_tags_and_malformed_entries_are_skipped() {
        let entries = vec![
            json!({"type": "rate_limit", "limit": 9}),
            json!({"type": "deny_pair", "from": "a"}),
            json!({"type": "max_peer_calls", "limit": "many"}),
            json!("not even an object"),
            json!({"type": "deny_outbound", "agent_slug": "spammer"}),
        ];
        let rules = parse_entries(&entries);
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0],
            CommRule::DenyOutbound {
                agent_slug: AgentSlug::new("spammer").expect("valid slug"),
                reason: None,
            }
        );
    }

    #[test]
    fn empty_slugs_invalidate_the_entry() {
        let entries = vec![json!({"type": "deny_inbound", "agent_slug": ""})];
        assert!(parse_entries(&entries).is_empty());
    }

    #[test]
    fn rule_round_trips_through_its_tag() {
        let rule = CommRule::RequireApproval {
            agent_slugs: vec![AgentSlug::new("auditor").expect("valid slug")],
        };
        let value = serde_json::to_value(&rule).expect("serialize");
        assert_eq!(value["type"], "require_approval");
        let parsed = parse_entries(std::slice::from_ref(&value));
        assert_eq!(parsed, vec![rule]);
    }
}
