//! # Player Plugin
//!
//! The upward surface a command-dispatch layer talks to.
//!
//! [`PlayerPlugin`] owns one [`PlayerRegistry`], one [`VolumeController`],
//! one [`FocusArbiter`] and the [`EventBridge`] they publish through, plus
//! the host window pass-throughs. None of its operations return errors:
//! missing capabilities and unknown ids degrade to neutral values.

use bridge_traits::{
    CapabilitySlot, EventSink, OrientationControl, PlayerFactory, PlayerId, ScreenControl,
    VolumeUiPolicy,
};
use core_playback::{
    FocusArbiter, FocusState, HostServices, PlayerHandle, PlayerRegistry, VolumeController,
};
use core_runtime::config::{PluginConfig, MAX_ENGINE_LOG_LEVEL};
use core_runtime::events::EventBridge;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Host log level used when the caller passes none (maps to engine level 5).
pub const DEFAULT_HOST_LOG_LEVEL: i32 = 500;

/// Hardware volume key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeKey {
    Up,
    Down,
    Mute,
}

impl VolumeKey {
    /// Map an Android key code; other keys are not volume keys.
    pub fn from_key_code(code: i32) -> Option<Self> {
        match code {
            24 => Some(Self::Up),
            25 => Some(Self::Down),
            164 => Some(Self::Mute),
            _ => None,
        }
    }
}

pub struct PlayerPlugin {
    registry: PlayerRegistry,
    volume: VolumeController,
    focus: FocusArbiter,
    events: EventBridge,
    factory: Arc<dyn PlayerFactory>,
    screen: CapabilitySlot<dyn ScreenControl>,
    orientation: CapabilitySlot<dyn OrientationControl>,
}

impl PlayerPlugin {
    pub fn new(config: PluginConfig) -> Self {
        let events = EventBridge::new();
        let focus = FocusArbiter::new(CapabilitySlot::from_option(config.focus_provider));
        let screen = CapabilitySlot::from_option(config.screen_control);
        let orientation = CapabilitySlot::from_option(config.orientation_control);

        let services = HostServices {
            focus: focus.clone(),
            events: events.clone(),
            screen: screen.clone(),
        };
        let registry = PlayerRegistry::new(Arc::clone(&config.player_factory), services);

        let volume = VolumeController::new(
            CapabilitySlot::from_option(config.volume_service),
            Arc::new(registry.clone()),
            events.clone(),
        );
        volume.set_policy(config.volume_ui_policy);
        volume.set_step_size(config.volume_step);
        volume.set_listening(config.listening);

        if let Some(level) = config.engine_log_level {
            config.player_factory.set_log_level(level);
        }

        info!(
            policy = ?config.volume_ui_policy,
            listening = config.listening,
            "Player plugin initialized"
        );

        Self {
            registry,
            volume,
            focus,
            events,
            factory: config.player_factory,
            screen,
            orientation,
        }
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    pub fn create_player(&self) -> PlayerId {
        self.registry.create().id
    }

    /// Release a player. Unknown ids are ignored.
    pub fn release_player(&self, id: PlayerId) {
        self.registry.release(id);
    }

    pub fn player(&self, id: PlayerId) -> Option<PlayerHandle> {
        self.registry.handle(id)
    }

    pub fn player_count(&self) -> usize {
        self.registry.len()
    }

    pub fn playable_count(&self) -> usize {
        self.registry.playable_count()
    }

    pub fn playing_count(&self) -> usize {
        self.registry.playing_count()
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Volume
    // ------------------------------------------------------------------

    /// Raise the volume by `step`, or by the configured step when `None`.
    pub fn volume_up(&self, step: Option<f32>) -> f32 {
        self.volume.adjust(self.resolve_step(step))
    }

    pub fn volume_down(&self, step: Option<f32>) -> f32 {
        self.volume.adjust(-self.resolve_step(step))
    }

    pub fn volume_mute(&self) -> f32 {
        self.volume.mute()
    }

    /// Set the volume. Without a level the current volume is reported unchanged.
    pub fn volume_set(&self, level: Option<f32>) -> f32 {
        match level {
            Some(level) => self.volume.set_level(level),
            None => self.volume.current_level(),
        }
    }

    pub fn system_volume(&self) -> f32 {
        self.volume.current_level()
    }

    pub fn volume_ui_mode(&self) -> VolumeUiPolicy {
        self.volume.policy()
    }

    pub fn set_volume_ui_mode(&self, policy: VolumeUiPolicy) {
        self.volume.set_policy(policy);
    }

    /// Apply a host policy code. Unknown codes leave the policy unchanged.
    pub fn set_volume_ui_mode_code(&self, code: i64) -> bool {
        match VolumeUiPolicy::from_code(code) {
            Some(policy) => {
                self.volume.set_policy(policy);
                true
            }
            None => {
                warn!(code, "Ignoring unknown volume UI mode");
                false
            }
        }
    }

    pub fn volume_step(&self) -> f32 {
        self.volume.step_size()
    }

    /// Override the step used by up/down and the volume keys. `None` restores
    /// the platform-derived default. Returns `false` for steps outside `(0, 1]`.
    pub fn set_volume_step(&self, step: Option<f32>) -> bool {
        self.volume.set_step_size(step)
    }

    /// Handle a hardware volume key.
    pub fn on_volume_key(&self, key: VolumeKey) -> bool {
        let level = match key {
            VolumeKey::Up => self.volume_up(None),
            VolumeKey::Down => self.volume_down(None),
            VolumeKey::Mute => self.volume_mute(),
        };
        debug!(?key, level, "Volume key handled");
        true
    }

    /// Handle a raw key code. Returns `false` for keys that are not volume keys.
    pub fn on_key_code(&self, code: i32) -> bool {
        match VolumeKey::from_key_code(code) {
            Some(key) => self.on_volume_key(key),
            None => false,
        }
    }

    fn resolve_step(&self, step: Option<f32>) -> f32 {
        match step {
            Some(step) if step.is_finite() => step,
            Some(step) => {
                warn!(step, "Ignoring non-finite volume step");
                self.volume.step_size()
            }
            None => self.volume.step_size(),
        }
    }

    // ------------------------------------------------------------------
    // Audio focus
    // ------------------------------------------------------------------

    pub fn request_audio_focus(&self) {
        self.focus.request();
    }

    pub fn release_audio_focus(&self) {
        self.focus.release();
    }

    pub fn audio_focus_state(&self) -> FocusState {
        self.focus.state()
    }

    // ------------------------------------------------------------------
    // Listener
    // ------------------------------------------------------------------

    /// The listener opted into volume change events.
    pub fn on_load(&self) {
        self.volume.set_listening(true);
    }

    pub fn on_unload(&self) {
        self.volume.set_listening(false);
    }

    pub fn is_listening(&self) -> bool {
        self.volume.is_listening()
    }

    /// Connect the event consumer. Records buffered so far are flushed to it
    /// first, in publish order.
    pub fn attach_listener(&self, listener: Arc<dyn EventSink>) {
        self.events.attach(listener);
    }

    pub fn detach_listener(&self) -> bool {
        self.events.detach()
    }

    pub fn events(&self) -> &EventBridge {
        &self.events
    }

    // ------------------------------------------------------------------
    // Engine
    // ------------------------------------------------------------------

    /// Forward a host log level (`0..=800`, default 500) to the engine as
    /// `level / 100`. Returns the engine level applied.
    pub fn set_engine_log_level(&self, level: Option<i32>) -> u8 {
        let host_level = level.unwrap_or(DEFAULT_HOST_LOG_LEVEL);
        let engine_level = (host_level / 100).clamp(0, i32::from(MAX_ENGINE_LOG_LEVEL)) as u8;
        self.factory.set_log_level(engine_level);
        debug!(host_level, engine_level, "Engine log level set");
        engine_level
    }

    // ------------------------------------------------------------------
    // Host window
    // ------------------------------------------------------------------

    pub fn attach_host_window(
        &self,
        screen: Arc<dyn ScreenControl>,
        orientation: Arc<dyn OrientationControl>,
    ) {
        self.screen.install(screen);
        self.orientation.install(orientation);
        info!("Host window attached");
    }

    pub fn detach_host_window(&self) {
        self.screen.clear();
        self.orientation.clear();
        info!("Host window detached");
    }

    pub fn set_screen_on(&self, on: bool) {
        match self.screen.get() {
            Some(screen) => screen.set_keep_screen_on(on),
            None => debug!(on, "No host window for keep-screen-on"),
        }
    }

    pub fn is_screen_kept_on(&self) -> bool {
        self.screen
            .get()
            .map(|screen| screen.is_screen_kept_on())
            .unwrap_or(false)
    }

    pub fn brightness(&self) -> f32 {
        self.screen
            .get()
            .map(|screen| screen.brightness())
            .unwrap_or(0.0)
    }

    pub fn set_brightness(&self, brightness: f32) {
        if let Some(screen) = self.screen.get() {
            screen.set_brightness(brightness);
        }
    }

    pub fn set_orientation_portrait(&self) -> bool {
        self.orientation
            .get()
            .map(|orientation| orientation.set_portrait())
            .unwrap_or(false)
    }

    pub fn set_orientation_landscape(&self) -> bool {
        self.orientation
            .get()
            .map(|orientation| orientation.set_landscape())
            .unwrap_or(false)
    }

    pub fn set_orientation_auto(&self) {
        if let Some(orientation) = self.orientation.get() {
            orientation.set_auto();
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Release every player and hand back audio focus. Returns the number of
    /// players released.
    pub fn shutdown(&self) -> usize {
        let released = self.registry.release_all();
        self.focus.release();
        info!(released, "Player plugin shut down");
        released
    }
}

impl fmt::Debug for PlayerPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerPlugin")
            .field("players", &self.registry.len())
            .field("focus", &self.focus.state())
            .field("volume_ui_mode", &self.volume.policy())
            .field("listening", &self.volume.is_listening())
            .field("listener_attached", &self.events.is_attached())
            .field("host_window", &self.screen.is_available())
            .finish()
    }
}
