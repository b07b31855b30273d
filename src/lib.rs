//! Workspace umbrella crate.
//!
//! Exposes the feature flags that map onto the individual workspace crates so
//! host applications can depend on `player-bridge-workspace` alone. With the
//! default `desktop-shims` feature the in-process capability implementations
//! from `bridge-desktop` are wired in as configuration defaults.

#[cfg(feature = "core")]
pub use core_service::*;
