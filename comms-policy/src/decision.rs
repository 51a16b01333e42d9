//! Decision lattice produced by an evaluation.
//!
//! A [`Decision`] starts at the most permissive element and only ever moves
//! toward more restrictive: `allowed` can flip true→false but never back,
//! the numeric ceilings only decrease, memory access only descends
//! `full → read_only → none` with `none` absorbing, and the approval flag
//! is sticky once set. The mutators on [`Decision`] are the only way the
//! fold touches the state, so the monotonic invariant lives here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rules::MemoryRestriction;

/// Recursion-depth ceiling applied when no policy narrows it.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// Peer-call ceiling applied when no policy narrows it.
pub const DEFAULT_MAX_PEER_CALLS: u32 = 50;

/// Memory-sharing level granted to the target agent.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryAccess {
    /// Unrestricted access to shared memory.
    Full,
    /// Read-only access to shared memory.
    ReadOnly,
    /// No shared-memory access.
    None,
}

impl MemoryAccess {
    /// Position in the descending lattice; lower is more restrictive.
    const fn rank(self) -> u8 {
        match self {
            Self::None => 0,
            Self::ReadOnly => 1,
            Self::Full => 2,
        }
    }

    /// Returns the more restrictive of the two levels.
    #[must_use]
    pub fn meet(self, other: Self) -> Self {
        if other.rank() < self.rank() { other } else { self }
    }
}

impl From<MemoryRestriction> for MemoryAccess {
    fn from(value: MemoryRestriction) -> Self {
        match value {
            MemoryRestriction::ReadOnly => Self::ReadOnly,
            MemoryRestriction::None => Self::None,
        }
    }
}

/// Restrictions attached to an allowed (or denied) call.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Restrictions {
    max_depth: u32,
    max_peer_calls: u32,
    memory_access: MemoryAccess,
    requires_approval: bool,
}

impl Restrictions {
    /// Returns the effective recursion-depth ceiling.
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Returns the effective peer-call ceiling.
    #[must_use]
    pub fn max_peer_calls(&self) -> u32 {
        self.max_peer_calls
    }

    /// Returns the memory-sharing level granted to the target agent.
    #[must_use]
    pub fn memory_access(&self) -> MemoryAccess {
        self.memory_access
    }

    /// Returns true when the call needs human sign-off before dispatch.
    #[must_use]
    pub fn requires_approval(&self) -> bool {
        self.requires_approval
    }
}

impl Default for Restrictions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_peer_calls: DEFAULT_MAX_PEER_CALLS,
            memory_access: MemoryAccess::Full,
            requires_approval: false,
        }
    }
}

/// Outcome of evaluating one proposed agent-to-agent call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    restrictions: Restrictions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    applied_policies: Vec<Uuid>,
}

impl Decision {
    /// Returns the most permissive lattice element.
    ///
    /// This is also the decision returned verbatim when no non-trivial
    /// scope filters exist or the repository holds no matching policies.
    #[must_use]
    pub fn default_open() -> Self {
        Self {
            allowed: true,
            reason: None,
            restrictions: Restrictions::default(),
            applied_policies: Vec::new(),
        }
    }

    /// Returns true when the call may be dispatched.
    #[must_use]
    pub fn allowed(&self) -> bool {
        self.allowed
    }

    /// Returns the denial reason; `None` while the call is still allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the restrictions accompanying the decision.
    #[must_use]
    pub fn restrictions(&self) -> &Restrictions {
        &self.restrictions
    }

    /// Returns the policies that matched at least one rule, in the order
    /// they were processed.
    #[must_use]
    pub fn applied_policies(&self) -> &[Uuid] {
        &self.applied_policies
    }

    /// Denies the call. Later denials overwrite the reason (last match
    /// wins) but `allowed` never returns to true.
    pub fn deny(&mut self, reason: impl Into<String>) {
        self.allowed = false;
        self.reason = Some(reason.into());
    }

    /// Narrows the depth ceiling; a higher limit is ignored.
    pub fn narrow_max_depth(&mut self, limit: u32) {
        self.restrictions.max_depth = self.restrictions.max_depth.min(limit);
    }

    /// Narrows the peer-call ceiling; a higher limit is ignored.
    pub fn narrow_max_peer_calls(&mut self, limit: u32) {
        self.restrictions.max_peer_calls = self.restrictions.max_peer_calls.min(limit);
    }

    /// Ratchets the memory-sharing level down. `None` is absorbing: once
    /// reached, no later restriction can raise the level again.
    pub fn restrict_memory(&mut self, access: MemoryAccess) {
        self.restrictions.memory_access = self.restrictions.memory_access.meet(access);
    }

    /// Flags the call as requiring human approval. Sticky.
    pub fn require_approval(&mut self) {
        self.restrictions.requires_approval = true;
    }

    /// Records a policy as applied, at most once, in processing order.
    pub fn record_policy(&mut self, id: Uuid) {
        if !self.applied_policies.contains(&id) {
            self.applied_policies.push(id);
        }
    }
}
