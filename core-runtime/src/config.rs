//! # Plugin Configuration
//!
//! Builder-based configuration for the player plugin.
//!
//! ## Overview
//!
//! [`PluginConfig::builder()`] collects the host capabilities and the initial
//! control settings, then [`build()`](PluginConfigBuilder::build) validates
//! them fail-fast. Runtime changes made later through the plugin (step,
//! UI policy, listening flag) start from these values.
//!
//! ## Required Dependencies
//!
//! - `PlayerFactory` - constructs the engine instance behind each player
//!
//! ## Optional Capabilities
//!
//! - `VolumeService` - system volume; absent means volume queries report `0.0`
//! - `FocusProvider` - audio focus; absent means focus requests are no-ops
//! - `ScreenControl`, `OrientationControl` - host window pass-throughs,
//!   usually installed later when a window attaches
//!
//! When the `desktop-shims` feature is enabled a headless player factory
//! from `bridge-desktop` is injected if none is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::VolumeUiPolicy;
//! use core_runtime::config::PluginConfig;
//! use std::sync::Arc;
//!
//! let config = PluginConfig::builder()
//!     .player_factory(Arc::new(MyEngineFactory))
//!     .volume_service(Arc::new(MyVolumeService))
//!     .volume_ui_policy(VolumeUiPolicy::HideIfPlaying)
//!     .volume_step(0.1)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    FocusProvider, OrientationControl, PlayerFactory, ScreenControl, VolumeService,
    VolumeUiPolicy,
};
use std::fmt;
use std::sync::Arc;

/// Highest native engine log level.
pub const MAX_ENGINE_LOG_LEVEL: u8 = 8;

/// Validated plugin configuration. Use [`PluginConfigBuilder`] to construct.
#[derive(Clone)]
pub struct PluginConfig {
    pub player_factory: Arc<dyn PlayerFactory>,
    pub volume_service: Option<Arc<dyn VolumeService>>,
    pub focus_provider: Option<Arc<dyn FocusProvider>>,
    pub screen_control: Option<Arc<dyn ScreenControl>>,
    pub orientation_control: Option<Arc<dyn OrientationControl>>,

    /// Fixed volume step in `(0, 1]`. `None` derives it from the platform's
    /// step count.
    pub volume_step: Option<f32>,

    pub volume_ui_policy: VolumeUiPolicy,

    /// Whether the listener opted into volume change events at startup
    pub listening: bool,

    /// Native engine log level applied at startup (`0..=8`)
    pub engine_log_level: Option<u8>,
}

impl fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginConfig")
            .field("player_factory", &"PlayerFactory { ... }")
            .field(
                "volume_service",
                &self.volume_service.as_ref().map(|_| "VolumeService { ... }"),
            )
            .field(
                "focus_provider",
                &self.focus_provider.as_ref().map(|_| "FocusProvider { ... }"),
            )
            .field(
                "screen_control",
                &self.screen_control.as_ref().map(|_| "ScreenControl { ... }"),
            )
            .field(
                "orientation_control",
                &self
                    .orientation_control
                    .as_ref()
                    .map(|_| "OrientationControl { ... }"),
            )
            .field("volume_step", &self.volume_step)
            .field("volume_ui_policy", &self.volume_ui_policy)
            .field("listening", &self.listening)
            .field("engine_log_level", &self.engine_log_level)
            .finish()
    }
}

impl PluginConfig {
    pub fn builder() -> PluginConfigBuilder {
        PluginConfigBuilder::default()
    }

    /// Checks:
    /// - a fixed volume step lies in `(0, 1]`
    /// - the engine log level is at most [`MAX_ENGINE_LOG_LEVEL`]
    pub fn validate(&self) -> Result<()> {
        if let Some(step) = self.volume_step {
            validate_volume_step(step)?;
        }

        if let Some(level) = self.engine_log_level {
            if level > MAX_ENGINE_LOG_LEVEL {
                return Err(Error::Config(format!(
                    "Engine log level {} exceeds maximum of {}",
                    level, MAX_ENGINE_LOG_LEVEL
                )));
            }
        }

        Ok(())
    }
}

/// Reject steps outside `(0, 1]`, including NaN.
pub fn validate_volume_step(step: f32) -> Result<()> {
    if step.is_finite() && step > 0.0 && step <= 1.0 {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Volume step must be in (0, 1], got {}",
            step
        )))
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_player_factory() -> Result<Arc<dyn PlayerFactory>> {
    use bridge_desktop::HeadlessPlayerFactory;

    let factory: Arc<dyn PlayerFactory> = Arc::new(HeadlessPlayerFactory::new());
    Ok(factory)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_player_factory() -> Result<Arc<dyn PlayerFactory>> {
    Err(Error::capability_missing(
        "PlayerFactory",
        "A PlayerFactory is required to construct player engine instances. \
         Desktop: enable the 'desktop-shims' feature to use the headless factory. \
         Mobile: inject the native engine factory.",
    ))
}

/// Builder for [`PluginConfig`].
#[derive(Default)]
pub struct PluginConfigBuilder {
    player_factory: Option<Arc<dyn PlayerFactory>>,
    volume_service: Option<Arc<dyn VolumeService>>,
    focus_provider: Option<Arc<dyn FocusProvider>>,
    screen_control: Option<Arc<dyn ScreenControl>>,
    orientation_control: Option<Arc<dyn OrientationControl>>,
    volume_step: Option<f32>,
    volume_ui_policy: VolumeUiPolicy,
    listening: bool,
    engine_log_level: Option<u8>,
}

impl PluginConfigBuilder {
    /// Sets the engine factory (required unless `desktop-shims` is enabled).
    pub fn player_factory(mut self, factory: Arc<dyn PlayerFactory>) -> Self {
        self.player_factory = Some(factory);
        self
    }

    pub fn volume_service(mut self, service: Arc<dyn VolumeService>) -> Self {
        self.volume_service = Some(service);
        self
    }

    pub fn focus_provider(mut self, provider: Arc<dyn FocusProvider>) -> Self {
        self.focus_provider = Some(provider);
        self
    }

    pub fn screen_control(mut self, screen: Arc<dyn ScreenControl>) -> Self {
        self.screen_control = Some(screen);
        self
    }

    pub fn orientation_control(mut self, orientation: Arc<dyn OrientationControl>) -> Self {
        self.orientation_control = Some(orientation);
        self
    }

    /// Fixed step used by volume up/down when the caller passes none.
    ///
    /// Default: one platform step, never finer than 1/16.
    pub fn volume_step(mut self, step: f32) -> Self {
        self.volume_step = Some(step);
        self
    }

    /// Default: [`VolumeUiPolicy::AlwaysShow`]
    pub fn volume_ui_policy(mut self, policy: VolumeUiPolicy) -> Self {
        self.volume_ui_policy = policy;
        self
    }

    /// Default: false
    pub fn listening(mut self, listening: bool) -> Self {
        self.listening = listening;
        self
    }

    pub fn engine_log_level(mut self, level: u8) -> Self {
        self.engine_log_level = Some(level);
        self
    }

    /// Validate and build.
    ///
    /// Fails if the player factory is missing (and no desktop default is
    /// available) or a value is out of range.
    pub fn build(self) -> Result<PluginConfig> {
        let player_factory = match self.player_factory {
            Some(factory) => factory,
            None => provide_default_player_factory()?,
        };

        let config = PluginConfig {
            player_factory,
            volume_service: self.volume_service,
            focus_provider: self.focus_provider,
            screen_control: self.screen_control,
            orientation_control: self.orientation_control,
            volume_step: self.volume_step,
            volume_ui_policy: self.volume_ui_policy,
            listening: self.listening,
            engine_log_level: self.engine_log_level,
        };

        config.validate()?;

        Ok(config)
    }
}
