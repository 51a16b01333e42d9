//! Facade for the agent communication-governance crates.
//!
//! Depend on this crate to pull in the governance engine and its shared
//! primitives together. The decision engine lives behind the default-on
//! `policy` feature so embedders that only need the shared types can opt
//! out of the async machinery.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use comms_primitives as primitives;

/// Communication-governance decision engine (enabled by `policy` feature).
#[cfg(feature = "policy")]
pub use comms_policy as policy;
