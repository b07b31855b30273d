//! # Player Control Plane
//!
//! Tracks live player instances and arbitrates the resources they share.
//!
//! ## Overview
//!
//! - [`PlayerRegistry`] allocates player ids, owns the engine instances and
//!   keeps the playable/playing aggregate.
//! - [`VolumeController`] drives the platform's stepped media volume through a
//!   normalized `[0, 1]` API and decides whether the on-screen indicator is
//!   shown, based on the registry aggregate.
//! - [`FocusArbiter`] owns the single audio-focus grant.
//! - Each engine instance talks back through a [`PlayerHost`](bridge_traits::PlayerHost)
//!   wired to the shared [`HostServices`].
//!
//! Every operation is synchronous and safe to call from any thread. None of
//! them fail: unavailable capabilities and unknown ids degrade to neutral
//! results and a log line.

pub mod focus;
pub mod host;
pub mod registry;
pub mod volume;

pub use focus::{FocusArbiter, FocusState};
pub use host::HostServices;
pub use registry::{PlayerHandle, PlayerRegistry};
pub use volume::{ActivityCounts, VolumeController, MIN_DEFAULT_STEP};
