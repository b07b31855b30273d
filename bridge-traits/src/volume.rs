//! System volume capability and the on-screen indicator policy.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Flags passed along with a step change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VolumeFlags {
    /// Ask the platform to show its volume indicator for this change.
    pub show_ui: bool,
}

impl VolumeFlags {
    pub fn show_ui(show_ui: bool) -> Self {
        Self { show_ui }
    }
}

/// Platform media-stream volume, expressed in discrete steps.
///
/// The core never caches `max_steps`; it is re-read for every conversion.
pub trait VolumeService: Send + Sync {
    /// Number of discrete steps above silence.
    fn max_steps(&self) -> Result<i32>;

    /// Current step in `0..=max_steps`.
    fn current_step(&self) -> Result<i32>;

    /// Apply a new step.
    fn set_step(&self, step: i32, flags: VolumeFlags) -> Result<()>;
}

/// Rule deciding whether a volume change surfaces the platform indicator.
///
/// The integer codes are the ones hosts send over the method channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeUiPolicy {
    /// Hide the indicator while any player holds a ready source.
    HideIfPlayable,
    /// Hide the indicator while any player is rendering.
    HideIfPlaying,
    NeverShow,
    #[default]
    AlwaysShow,
}

impl VolumeUiPolicy {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::HideIfPlayable),
            1 => Some(Self::HideIfPlaying),
            2 => Some(Self::NeverShow),
            3 => Some(Self::AlwaysShow),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::HideIfPlayable => 0,
            Self::HideIfPlaying => 1,
            Self::NeverShow => 2,
            Self::AlwaysShow => 3,
        }
    }

    /// Evaluate the policy against the current aggregate counts.
    pub fn show_ui(self, playable_count: usize, playing_count: usize) -> bool {
        match self {
            Self::AlwaysShow => true,
            Self::HideIfPlaying => playing_count == 0,
            Self::HideIfPlayable => playable_count == 0,
            Self::NeverShow => false,
        }
    }
}
