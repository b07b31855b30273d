//! Per-player host context.
//!
//! Each engine instance receives a [`PlayerHost`] bound to its id. State
//! flips become ±1 notifications to the registry; focus, keep-screen-on and
//! events are routed to the shared services. Once the player is released
//! the context goes inert.

use crate::focus::FocusArbiter;
use crate::registry::RegistryInner;
use bridge_traits::{CapabilitySlot, EventRecord, PlayerHost, PlayerId, ScreenControl};
use core_runtime::events::EventBridge;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Shared services reachable from every player.
#[derive(Clone, Debug)]
pub struct HostServices {
    pub focus: FocusArbiter,
    pub events: EventBridge,
    pub screen: CapabilitySlot<dyn ScreenControl>,
}

pub(crate) struct PlayerContext {
    id: PlayerId,
    registry: Weak<RegistryInner>,
    services: HostServices,
}

impl PlayerContext {
    pub(crate) fn new(id: PlayerId, registry: Weak<RegistryInner>, services: HostServices) -> Self {
        Self {
            id,
            registry,
            services,
        }
    }

    fn live_registry(&self) -> Option<Arc<RegistryInner>> {
        let registry = self.registry.upgrade()?;
        if registry.contains(self.id) {
            Some(registry)
        } else {
            trace!(player = %self.id, "Ignoring call from released player");
            None
        }
    }
}

impl PlayerHost for PlayerContext {
    fn player_id(&self) -> PlayerId {
        self.id
    }

    fn on_playable_change(&self, delta: i32) {
        if let Some(registry) = self.registry.upgrade() {
            registry.notify_playable(self.id, delta);
        }
    }

    fn on_playing_change(&self, delta: i32) {
        if let Some(registry) = self.registry.upgrade() {
            registry.notify_playing(self.id, delta);
        }
    }

    fn audio_focus(&self, request: bool) {
        if self.live_registry().is_none() {
            return;
        }
        if request {
            self.services.focus.request();
        } else {
            self.services.focus.release();
        }
    }

    fn set_screen_on(&self, on: bool) {
        if self.live_registry().is_none() {
            return;
        }
        match self.services.screen.get() {
            Some(screen) => screen.set_keep_screen_on(on),
            None => debug!(player = %self.id, on, "No host window; keep-screen-on ignored"),
        }
    }

    fn publish(&self, record: EventRecord) {
        if self.live_registry().is_none() {
            return;
        }
        self.services.events.publish(record);
    }
}
