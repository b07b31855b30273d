//! # Player Registry
//!
//! Id-to-instance mapping plus the playable/playing aggregate.
//!
//! ## Overview
//!
//! Ids come from a strictly increasing counter and are never reused, so a
//! late notification from a released instance can never be attributed to a
//! newer player. Each entry keeps the last reported flags; a notification
//! only moves the aggregate when it actually flips its entry's flag, which
//! keeps the counts equal to the live sum in O(1) per update.
//!
//! Engine instances are constructed and torn down outside the registry lock.
//! An instance may therefore report state from its constructor, and a
//! release racing with construction tears the fresh instance down as soon as
//! the factory returns. Players still registered when the last registry
//! handle is dropped are released then.

use crate::host::{HostServices, PlayerContext};
use crate::volume::ActivityCounts;
use bridge_traits::{PlayerFactory, PlayerHost, PlayerId, PlayerInstance};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Snapshot of one registered player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHandle {
    pub id: PlayerId,
    pub is_playable: bool,
    pub is_playing: bool,
}

impl PlayerHandle {
    fn new(id: PlayerId) -> Self {
        Self {
            id,
            is_playable: false,
            is_playing: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activity {
    Playable,
    Playing,
}

/// Registry of live players. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PlayerRegistry {
    inner: Arc<RegistryInner>,
}

pub(crate) struct RegistryInner {
    state: Mutex<RegistryState>,
    factory: Arc<dyn PlayerFactory>,
    services: HostServices,
}

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    entries: BTreeMap<PlayerId, PlayerEntry>,
    playable: usize,
    playing: usize,
}

struct PlayerEntry {
    handle: PlayerHandle,
    /// `None` while the factory is still constructing it.
    instance: Option<Box<dyn PlayerInstance>>,
}

impl PlayerRegistry {
    pub fn new(factory: Arc<dyn PlayerFactory>, services: HostServices) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                state: Mutex::new(RegistryState::default()),
                factory,
                services,
            }),
        }
    }

    /// Allocate the next id and construct its engine instance.
    pub fn create(&self) -> PlayerHandle {
        let id = {
            let mut state = self.inner.state.lock();
            let id = PlayerId::new(state.next_id);
            state.next_id += 1;
            state.entries.insert(
                id,
                PlayerEntry {
                    handle: PlayerHandle::new(id),
                    instance: None,
                },
            );
            id
        };

        let host: Arc<dyn PlayerHost> = Arc::new(PlayerContext::new(
            id,
            Arc::downgrade(&self.inner),
            self.inner.services.clone(),
        ));
        let instance = self.inner.factory.create(host);

        let (handle, orphan) = {
            let mut state = self.inner.state.lock();
            match state.entries.get_mut(&id) {
                Some(entry) => {
                    entry.instance = Some(instance);
                    (entry.handle, None)
                }
                None => (PlayerHandle::new(id), Some(instance)),
            }
        };

        if let Some(mut instance) = orphan {
            debug!(player = %id, "Player released during construction; tearing down");
            instance.release();
        } else {
            info!(player = %id, "Player created");
        }

        handle
    }

    /// Tear down player `id`. Unknown ids are ignored.
    ///
    /// Returns `true` if a player was removed.
    pub fn release(&self, id: PlayerId) -> bool {
        let entry = {
            let mut state = self.inner.state.lock();
            let Some(entry) = state.entries.remove(&id) else {
                trace!(player = %id, "Release of unknown player ignored");
                return false;
            };
            if entry.handle.is_playable {
                state.playable -= 1;
            }
            if entry.handle.is_playing {
                state.playing -= 1;
            }
            entry
        };

        if let Some(mut instance) = entry.instance {
            instance.release();
        }
        info!(player = %id, "Player released");
        true
    }

    /// Release every player. Returns how many were removed.
    pub fn release_all(&self) -> usize {
        let entries = {
            let mut state = self.inner.state.lock();
            state.playable = 0;
            state.playing = 0;
            std::mem::take(&mut state.entries)
        };

        let count = entries.len();
        for (_, entry) in entries {
            if let Some(mut instance) = entry.instance {
                instance.release();
            }
        }
        if count > 0 {
            info!(count, "Released all players");
        }
        count
    }

    pub fn notify_playable_change(&self, id: PlayerId, delta: i32) {
        self.inner.notify_playable(id, delta);
    }

    pub fn notify_playing_change(&self, id: PlayerId, delta: i32) {
        self.inner.notify_playing(id, delta);
    }

    pub fn playable_count(&self) -> usize {
        self.inner.state.lock().playable
    }

    pub fn playing_count(&self) -> usize {
        self.inner.state.lock().playing
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.inner.contains(id)
    }

    pub fn handle(&self, id: PlayerId) -> Option<PlayerHandle> {
        self.inner
            .state
            .lock()
            .entries
            .get(&id)
            .map(|entry| entry.handle)
    }

    /// Registered ids, ascending.
    pub fn ids(&self) -> Vec<PlayerId> {
        self.inner.state.lock().entries.keys().copied().collect()
    }
}

impl ActivityCounts for PlayerRegistry {
    fn playable_count(&self) -> usize {
        PlayerRegistry::playable_count(self)
    }

    fn playing_count(&self) -> usize {
        PlayerRegistry::playing_count(self)
    }
}

impl fmt::Debug for PlayerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PlayerRegistry")
            .field("players", &state.entries.len())
            .field("next_id", &state.next_id)
            .field("playable", &state.playable)
            .field("playing", &state.playing)
            .finish()
    }
}

impl RegistryInner {
    pub(crate) fn contains(&self, id: PlayerId) -> bool {
        self.state.lock().entries.contains_key(&id)
    }

    pub(crate) fn notify_playable(&self, id: PlayerId, delta: i32) {
        self.apply_delta(id, delta, Activity::Playable);
    }

    pub(crate) fn notify_playing(&self, id: PlayerId, delta: i32) {
        self.apply_delta(id, delta, Activity::Playing);
    }

    fn apply_delta(&self, id: PlayerId, delta: i32, activity: Activity) {
        if delta == 0 {
            return;
        }
        let on = delta > 0;

        let mut state = self.state.lock();
        let RegistryState {
            entries,
            playable,
            playing,
            ..
        } = &mut *state;

        let Some(entry) = entries.get_mut(&id) else {
            trace!(player = %id, ?activity, "Notification for unknown player ignored");
            return;
        };

        let (flag, count) = match activity {
            Activity::Playable => (&mut entry.handle.is_playable, playable),
            Activity::Playing => (&mut entry.handle.is_playing, playing),
        };
        if *flag == on {
            return;
        }

        *flag = on;
        if on {
            *count += 1;
        } else {
            *count -= 1;
        }
        debug!(player = %id, ?activity, on, count = *count, "Player activity changed");
    }
}

/// Players still registered when the last registry handle goes away are
/// torn down here.
impl Drop for RegistryInner {
    fn drop(&mut self) {
        let entries = std::mem::take(&mut self.state.get_mut().entries);
        if entries.is_empty() {
            return;
        }

        let count = entries.len();
        for (_, entry) in entries {
            if let Some(mut instance) = entry.instance {
                instance.release();
            }
        }
        debug!(count, "Released players left in dropped registry");
    }
}
