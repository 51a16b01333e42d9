//! Core shared types for agent communication governance.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod scope;
mod slug;

/// Error type and result alias shared across the governance crates.
pub use error::{Error, Result};
/// Policy scope levels and repository query filters.
pub use scope::{PolicyScope, ScopeFilter};
/// Validated agent slug identifier.
pub use slug::AgentSlug;
