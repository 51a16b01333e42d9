//! Shared error definitions for governance primitives.

use thiserror::Error;

/// Result alias used throughout the governance primitives.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing governance primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided agent slug failed validation.
    #[error("invalid agent slug `{slug}`: {reason}")]
    InvalidSlug {
        /// The offending slug string.
        slug: String,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },

    /// The provided scope identifier failed validation.
    #[error("invalid scope id for `{scope}` scope: {reason}")]
    InvalidScopeId {
        /// The scope level the identifier was meant to bind to.
        scope: String,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },
}
