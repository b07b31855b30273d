//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided capabilities (engine factory, system
//! volume, audio focus, window controls) into the player control plane and
//! exposes the result as a single [`PlayerPlugin`]. Desktop apps typically
//! enable the `desktop-shims` feature (which depends on `bridge-desktop`)
//! and call [`bootstrap_desktop`]; mobile hosts inject their native
//! capabilities through [`PluginConfig::builder`] and call [`bootstrap`].

pub mod error;
pub mod plugin;

pub use error::{CoreError, Result};
pub use plugin::{PlayerPlugin, VolumeKey, DEFAULT_HOST_LOG_LEVEL};

pub use bridge_traits::{
    EventRecord, EventSink, EventValue, FocusChange, PlayerId, VolumeUiPolicy, VOLUME_EVENT,
};
pub use core_playback::{FocusState, PlayerHandle};
pub use core_runtime::config::{PluginConfig, PluginConfigBuilder};
pub use core_runtime::events::{event_channel, ChannelSink, EventReceiver};
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};

#[cfg(feature = "desktop-shims")]
use std::sync::Arc;

/// Validate the configuration and construct the plugin.
///
/// ```
/// # fn main() -> core_service::Result<()> {
/// use core_service::{bootstrap, PluginConfig, VolumeUiPolicy};
///
/// let plugin = bootstrap(
///     PluginConfig::builder().volume_ui_policy(VolumeUiPolicy::HideIfPlaying),
/// )?;
/// let id = plugin.create_player();
/// plugin.release_player(id);
/// # Ok(())
/// # }
/// ```
pub fn bootstrap(builder: PluginConfigBuilder) -> Result<PlayerPlugin> {
    let config = builder.build().map_err(CoreError::from_runtime)?;
    Ok(PlayerPlugin::new(config))
}

/// Install the global `tracing` subscriber, then [`bootstrap`].
///
/// Fails with [`CoreError::InitializationFailed`] if a subscriber is
/// already installed.
pub fn bootstrap_with_logging(
    builder: PluginConfigBuilder,
    logging: LoggingConfig,
) -> Result<PlayerPlugin> {
    init_logging(logging).map_err(CoreError::from_runtime)?;
    bootstrap(builder)
}

/// Convenience bootstrapper for desktop hosts.
///
/// Wires the in-process software volume, local focus provider and a headless
/// window from `bridge-desktop`, and attaches a listener that writes every
/// event to `tracing`.
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop() -> Result<PlayerPlugin> {
    use bridge_desktop::{
        HeadlessPlayerFactory, HeadlessWindow, LocalFocusProvider, SoftwareVolume,
        TracingEventSink,
    };

    let window = Arc::new(HeadlessWindow::new());
    let plugin = bootstrap(
        PluginConfig::builder()
            .player_factory(Arc::new(HeadlessPlayerFactory::new()))
            .volume_service(Arc::new(SoftwareVolume::new()))
            .focus_provider(Arc::new(LocalFocusProvider::new()))
            .screen_control(window.clone())
            .orientation_control(window)
            .listening(true),
    )?;
    plugin.attach_listener(Arc::new(TracingEventSink::new()));
    Ok(plugin)
}
