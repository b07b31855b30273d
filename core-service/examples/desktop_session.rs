//! Desktop session walkthrough
//!
//! Boots the plugin on the in-process desktop capabilities, drives a player
//! through its lifecycle and prints the events an async listener receives.
//!
//! Run with:
//! ```bash
//! cargo run -p core-service --example desktop_session
//!
//! # JSON logs
//! cargo run -p core-service --example desktop_session -- json
//! ```

use anyhow::Context;
use bridge_desktop::{HeadlessPlayerFactory, HeadlessWindow, LocalFocusProvider, SoftwareVolume};
use bridge_traits::{FocusChange, LogLevel};
use core_service::{
    bootstrap_with_logging, event_channel, LogFormat, LoggingConfig, PluginConfig, VolumeKey,
    VolumeUiPolicy,
};
use std::env;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = match env::args().nth(1).as_deref() {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };

    let factory = Arc::new(HeadlessPlayerFactory::new());
    let volume = Arc::new(SoftwareVolume::new());
    let focus = Arc::new(LocalFocusProvider::new());
    let window = Arc::new(HeadlessWindow::new());

    let plugin = bootstrap_with_logging(
        PluginConfig::builder()
            .player_factory(factory.clone())
            .volume_service(volume)
            .focus_provider(focus.clone())
            .volume_ui_policy(VolumeUiPolicy::HideIfPlaying)
            .listening(true),
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Debug),
    )
    .context("failed to start player plugin")?;

    let (sink, mut receiver) = event_channel();
    plugin.attach_listener(Arc::new(sink));
    plugin.attach_host_window(window.clone(), window);

    let id = plugin.create_player();
    factory.set_playable(id, true);
    factory
        .host(id)
        .context("player vanished right after creation")?
        .audio_focus(true);
    factory.set_playing(id, true);
    plugin.set_screen_on(true);

    plugin.on_volume_key(VolumeKey::Up);
    plugin.on_volume_key(VolumeKey::Down);
    focus.revoke(FocusChange::LossTransient);
    info!(state = ?plugin.audio_focus_state(), "Focus after revocation");

    factory.set_playing(id, false);
    plugin.volume_set(Some(0.75));

    plugin.shutdown();
    plugin.detach_listener();
    drop(plugin);

    while let Some(record) = receiver.try_recv() {
        println!("{}", record.to_json());
    }

    Ok(())
}
