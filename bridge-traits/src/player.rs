//! Player engine bridge traits.
//!
//! The decode/render engine behind each player instance lives outside the
//! core. Hosts supply a [`PlayerFactory`]; the registry asks it for one
//! [`PlayerInstance`] per created player and hands every instance a
//! [`PlayerHost`] through which it reports state flips and reaches shared
//! services (audio focus, keep-screen-on, the event channel).

use crate::event::EventRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a managed player instance.
///
/// Allocated by the registry from a strictly increasing counter and never
/// reused while the registry is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(u64);

impl PlayerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PlayerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Services the core offers to one player instance.
///
/// State flips are reported as single `+1`/`-1` deltas, one call per flip.
/// Calls made after the player was released are ignored.
pub trait PlayerHost: Send + Sync {
    fn player_id(&self) -> PlayerId;

    /// The instance gained (`+1`) or lost (`-1`) a ready media source.
    fn on_playable_change(&self, delta: i32);

    /// The instance started (`+1`) or stopped (`-1`) rendering.
    fn on_playing_change(&self, delta: i32);

    /// Request (`true`) or release (`false`) the shared audio-focus grant.
    fn audio_focus(&self, request: bool);

    /// Keep the host screen awake while playing.
    fn set_screen_on(&self, on: bool);

    /// Publish a player-originated record to the listener.
    fn publish(&self, record: EventRecord);
}

/// Engine-side player instance owned by the registry.
pub trait PlayerInstance: Send {
    /// Tear down native resources. Called exactly once, when the player is
    /// released.
    fn release(&mut self);
}

/// Constructs engine instances.
pub trait PlayerFactory: Send + Sync {
    /// Construct the engine instance for a freshly allocated player. The
    /// instance may report state through `host` from inside this call.
    fn create(&self, host: Arc<dyn PlayerHost>) -> Box<dyn PlayerInstance>;

    /// Set the engine's native log verbosity (`0..=8`).
    fn set_log_level(&self, _level: u8) {}
}
