//! System audio-focus capability.
//!
//! A focus grant is an exclusive, revocable permission to play audio without
//! being ducked or interrupted by other sources. The provider arbitrates
//! grants between applications and may revoke one at any time; it reports
//! that through the [`FocusChangeListener`] handed over with the request.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Opaque token identifying an outstanding grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusGrant(u64);

impl FocusGrant {
    pub fn new(token: u64) -> Self {
        Self(token)
    }

    pub fn token(&self) -> u64 {
        self.0
    }
}

/// Outcome of a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusResponse {
    Granted(FocusGrant),
    Denied,
}

/// Focus transitions reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusChange {
    Gain,
    Loss,
    LossTransient,
    /// Another source plays briefly; we may keep playing at reduced volume.
    LossTransientCanDuck,
}

impl FocusChange {
    /// Whether this change revokes the grant we hold.
    pub fn is_loss(self) -> bool {
        matches!(self, FocusChange::Loss | FocusChange::LossTransient)
    }
}

/// Receiver of asynchronous focus changes.
pub trait FocusChangeListener: Send + Sync {
    fn on_focus_change(&self, change: FocusChange);
}

/// Platform audio-focus arbiter.
///
/// Implementations deliver focus changes from their own context and must not
/// call the listener from inside `request_focus` or `release_focus`.
pub trait FocusProvider: Send + Sync {
    fn request_focus(&self, listener: Arc<dyn FocusChangeListener>) -> Result<FocusResponse>;

    fn release_focus(&self, grant: FocusGrant) -> Result<()>;
}
