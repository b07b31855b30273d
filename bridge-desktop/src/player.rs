//! Headless player engine

use bridge_traits::{PlayerFactory, PlayerHost, PlayerId, PlayerInstance};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Engine log level a freshly created factory reports.
pub const DEFAULT_ENGINE_LOG_LEVEL: u8 = 5;

/// Factory for players without a decoder.
///
/// Nothing plays by itself. The owner drives each player's state through
/// [`set_playable`](Self::set_playable) and [`set_playing`](Self::set_playing),
/// which report the flips to the core exactly as an engine would, or reaches
/// the player's host directly via [`host`](Self::host).
pub struct HeadlessPlayerFactory {
    shared: Arc<Mutex<Shared>>,
    log_level: Mutex<u8>,
}

#[derive(Default)]
struct Shared {
    live: BTreeMap<PlayerId, LivePlayer>,
    released: Vec<PlayerId>,
}

struct LivePlayer {
    host: Arc<dyn PlayerHost>,
    playable: bool,
    playing: bool,
}

impl HeadlessPlayerFactory {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared::default())),
            log_level: Mutex::new(DEFAULT_ENGINE_LOG_LEVEL),
        }
    }

    /// Host handed to the live player `id`.
    pub fn host(&self, id: PlayerId) -> Option<Arc<dyn PlayerHost>> {
        self.shared
            .lock()
            .live
            .get(&id)
            .map(|player| Arc::clone(&player.host))
    }

    /// Ids of players created and not yet released, ascending.
    pub fn live_players(&self) -> Vec<PlayerId> {
        self.shared.lock().live.keys().copied().collect()
    }

    /// Ids of released players in release order.
    pub fn released_players(&self) -> Vec<PlayerId> {
        self.shared.lock().released.clone()
    }

    pub fn log_level(&self) -> u8 {
        *self.log_level.lock()
    }

    /// Mark the player's media source ready (or gone).
    ///
    /// Returns `false` if `id` is not live. Setting the current value again
    /// reports nothing.
    pub fn set_playable(&self, id: PlayerId, playable: bool) -> bool {
        let Some((host, changed)) = self.flip(id, |player| {
            let changed = player.playable != playable;
            player.playable = playable;
            changed
        }) else {
            return false;
        };

        if changed {
            host.on_playable_change(if playable { 1 } else { -1 });
        }
        true
    }

    /// Start or stop rendering. Returns `false` if `id` is not live.
    pub fn set_playing(&self, id: PlayerId, playing: bool) -> bool {
        let Some((host, changed)) = self.flip(id, |player| {
            let changed = player.playing != playing;
            player.playing = playing;
            changed
        }) else {
            return false;
        };

        if changed {
            host.on_playing_change(if playing { 1 } else { -1 });
        }
        true
    }

    fn flip(
        &self,
        id: PlayerId,
        update: impl FnOnce(&mut LivePlayer) -> bool,
    ) -> Option<(Arc<dyn PlayerHost>, bool)> {
        let mut shared = self.shared.lock();
        let player = shared.live.get_mut(&id)?;
        let changed = update(player);
        Some((Arc::clone(&player.host), changed))
    }
}

impl Default for HeadlessPlayerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerFactory for HeadlessPlayerFactory {
    fn create(&self, host: Arc<dyn PlayerHost>) -> Box<dyn PlayerInstance> {
        let id = host.player_id();
        self.shared.lock().live.insert(
            id,
            LivePlayer {
                host,
                playable: false,
                playing: false,
            },
        );
        debug!(player = %id, "Headless player created");

        Box::new(HeadlessPlayer {
            id,
            shared: Arc::clone(&self.shared),
        })
    }

    fn set_log_level(&self, level: u8) {
        *self.log_level.lock() = level;
        debug!(level, "Headless engine log level set");
    }
}

struct HeadlessPlayer {
    id: PlayerId,
    shared: Arc<Mutex<Shared>>,
}

impl PlayerInstance for HeadlessPlayer {
    fn release(&mut self) {
        let mut shared = self.shared.lock();
        if shared.live.remove(&self.id).is_some() {
            shared.released.push(self.id);
            debug!(player = %self.id, "Headless player released");
        }
    }
}
