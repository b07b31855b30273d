//! # Audio Focus Arbiter
//!
//! Owns the process's single audio-focus grant on behalf of every player.
//!
//! ```text
//!               request() ── provider grants ──┐
//!   ┌──────────┐                               ▼   ┌──────┐
//!   │ Released │ <──── release() ───────────────── │ Held │
//!   └──────────┘ <──── external Loss/LossTransient │      │
//!                                                  └──────┘
//! ```
//!
//! Requests while Held and releases while Released are no-ops, so players
//! can call through their host without coordinating. The provider may revoke
//! the grant at any moment; the arbiter learns about it through a listener
//! registered with each request and drops to Released without calling back
//! into the provider.

use bridge_traits::{
    CapabilitySlot, FocusChange, FocusChangeListener, FocusGrant, FocusProvider, FocusResponse,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    Released,
    Held,
}

/// Serialized Released/Held state machine over a [`FocusProvider`].
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct FocusArbiter {
    inner: Arc<FocusInner>,
}

struct FocusInner {
    provider: CapabilitySlot<dyn FocusProvider>,
    /// `Some` exactly while Held.
    grant: Mutex<Option<FocusGrant>>,
}

impl FocusArbiter {
    pub fn new(provider: CapabilitySlot<dyn FocusProvider>) -> Self {
        Self {
            inner: Arc::new(FocusInner {
                provider,
                grant: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> FocusState {
        if self.is_held() {
            FocusState::Held
        } else {
            FocusState::Released
        }
    }

    pub fn is_held(&self) -> bool {
        self.inner.grant.lock().is_some()
    }

    /// Acquire the grant unless already Held.
    ///
    /// A denial, a provider error or a missing provider leaves the arbiter
    /// Released.
    pub fn request(&self) {
        let mut grant = self.inner.grant.lock();
        if grant.is_some() {
            debug!("Audio focus already held");
            return;
        }

        let Some(provider) = self.inner.provider.get() else {
            warn!("No focus provider available; audio focus request ignored");
            return;
        };

        let listener: Arc<dyn FocusChangeListener> = Arc::new(LossRelay {
            inner: Arc::downgrade(&self.inner),
        });

        match provider.request_focus(listener) {
            Ok(FocusResponse::Granted(granted)) => {
                *grant = Some(granted);
                debug!(token = granted.token(), "Audio focus held");
            }
            Ok(FocusResponse::Denied) => {
                debug!("Audio focus request denied");
            }
            Err(err) => {
                warn!(error = %err, "Audio focus request failed");
            }
        }
    }

    /// Hand the grant back unless already Released.
    ///
    /// The arbiter is Released afterwards even if the provider reports an
    /// error.
    pub fn release(&self) {
        let mut grant = self.inner.grant.lock();
        let Some(held) = grant.take() else {
            return;
        };
        debug!(token = held.token(), "Audio focus released");

        match self.inner.provider.get() {
            Some(provider) => {
                if let Err(err) = provider.release_focus(held) {
                    warn!(error = %err, "Focus provider failed to release grant");
                }
            }
            None => warn!("Focus provider gone; grant dropped without release"),
        }
    }

    /// Record an involuntary loss: Released, grant forgotten.
    pub fn on_external_loss(&self) {
        self.inner.on_external_loss();
    }

    /// Route a provider focus change. Only `Loss` and `LossTransient` change
    /// state.
    pub fn on_focus_change(&self, change: FocusChange) {
        self.inner.on_focus_change(change);
    }
}

impl fmt::Debug for FocusArbiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusArbiter")
            .field("state", &self.state())
            .field("provider", &self.inner.provider)
            .finish()
    }
}

impl FocusInner {
    fn on_external_loss(&self) {
        if let Some(lost) = self.grant.lock().take() {
            debug!(token = lost.token(), "Audio focus lost externally");
        }
    }

    fn on_focus_change(&self, change: FocusChange) {
        if change.is_loss() {
            self.on_external_loss();
        } else {
            debug!(?change, "Audio focus change ignored");
        }
    }
}

/// Listener registered with the provider. Holds the arbiter weakly so a
/// provider keeping stale listeners does not keep it alive.
struct LossRelay {
    inner: Weak<FocusInner>,
}

impl FocusChangeListener for LossRelay {
    fn on_focus_change(&self, change: FocusChange) {
        if let Some(inner) = self.inner.upgrade() {
            inner.on_focus_change(change);
        }
    }
}
