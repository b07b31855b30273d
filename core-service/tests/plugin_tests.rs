//! End-to-end plugin scenarios over the desktop capability shims

use bridge_desktop::{
    HeadlessPlayerFactory, HeadlessWindow, LocalFocusProvider, Orientation, SoftwareVolume,
};
use bridge_traits::{
    EventRecord, EventSink, EventValue, FocusChange, PlayerFactory, PlayerHost, PlayerId,
    PlayerInstance, ScreenControl, VolumeFlags, VolumeService, VolumeUiPolicy, VOLUME_EVENT,
};
use core_service::{
    bootstrap, event_channel, EventReceiver, FocusState, PlayerPlugin, PluginConfig, VolumeKey,
};
use mockall::mock;
use mockall::predicate::eq;
use parking_lot::Mutex;
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

mock! {
    Factory {}

    impl PlayerFactory for Factory {
        fn create(&self, host: Arc<dyn PlayerHost>) -> Box<dyn PlayerInstance>;
        fn set_log_level(&self, level: u8);
    }
}

struct Harness {
    plugin: PlayerPlugin,
    factory: Arc<HeadlessPlayerFactory>,
    volume: Arc<SoftwareVolume>,
    focus: Arc<LocalFocusProvider>,
}

fn harness(initial_step: i32) -> Harness {
    let factory = Arc::new(HeadlessPlayerFactory::new());
    let volume = Arc::new(SoftwareVolume::with_max_steps(16).at_step(initial_step));
    let focus = Arc::new(LocalFocusProvider::new());

    let plugin = bootstrap(
        PluginConfig::builder()
            .player_factory(factory.clone())
            .volume_service(volume.clone())
            .focus_provider(focus.clone()),
    )
    .unwrap();

    Harness {
        plugin,
        factory,
        volume,
        focus,
    }
}

fn listen(plugin: &PlayerPlugin) -> EventReceiver {
    let (sink, receiver) = event_channel();
    plugin.attach_listener(Arc::new(sink));
    plugin.on_load();
    receiver
}

fn volume_of(record: &EventRecord) -> Option<f64> {
    record.get("vol").and_then(EventValue::as_f64)
}

// ============================================================================
// Players
// ============================================================================

#[test]
fn player_ids_increase_and_are_not_reused() {
    let h = harness(0);

    assert_eq!(h.plugin.create_player(), PlayerId::new(0));
    assert_eq!(h.plugin.create_player(), PlayerId::new(1));

    h.plugin.release_player(PlayerId::new(0));
    h.plugin.release_player(PlayerId::new(0));
    assert_eq!(h.plugin.create_player(), PlayerId::new(2));
    assert_eq!(h.plugin.player_count(), 2);
    assert_eq!(h.factory.released_players(), vec![PlayerId::new(0)]);
}

#[test]
fn player_state_reaches_aggregate() {
    let h = harness(0);
    let id = h.plugin.create_player();

    h.factory.set_playable(id, true);
    h.factory.set_playing(id, true);
    assert_eq!(h.plugin.playable_count(), 1);
    assert_eq!(h.plugin.playing_count(), 1);
    assert!(h.plugin.player(id).unwrap().is_playing);

    h.plugin.release_player(id);
    assert_eq!(h.plugin.playable_count(), 0);
    assert_eq!(h.plugin.playing_count(), 0);
    assert!(h.plugin.player(id).is_none());
}

// ============================================================================
// Volume
// ============================================================================

#[test]
fn volume_set_quantizes_and_publishes() {
    let h = harness(0);
    let mut receiver = listen(&h.plugin);

    assert_eq!(h.plugin.volume_set(Some(0.5)), 0.5);
    assert_eq!(h.volume.current_step().unwrap(), 8);

    let record = receiver.try_recv().unwrap();
    assert_eq!(record.event(), VOLUME_EVENT);
    assert_eq!(volume_of(&record), Some(0.5));
}

#[test]
fn volume_set_without_level_reports_current() {
    let h = harness(4);
    let mut receiver = listen(&h.plugin);

    assert_eq!(h.plugin.volume_set(None), 0.25);
    assert_eq!(h.plugin.system_volume(), 0.25);
    assert_eq!(h.volume.write_count(), 0);
    assert!(receiver.try_recv().is_none());
}

#[test]
fn up_and_down_use_configured_or_explicit_step() {
    let h = harness(8);

    assert_eq!(h.plugin.volume_step(), 1.0 / 16.0);
    assert_eq!(h.plugin.volume_up(None), 9.0 / 16.0);
    assert_eq!(h.plugin.volume_down(Some(0.25)), 5.0 / 16.0);

    assert!(h.plugin.set_volume_step(Some(0.5)));
    assert_eq!(h.plugin.volume_up(None), 13.0 / 16.0);
    assert_eq!(h.plugin.volume_up(None), 1.0);

    assert!(!h.plugin.set_volume_step(Some(0.0)));
    assert_eq!(h.plugin.volume_step(), 0.5);
}

#[test]
fn volume_keys_step_and_mute() {
    let h = harness(8);

    assert!(h.plugin.on_volume_key(VolumeKey::Up));
    assert_eq!(h.plugin.system_volume(), 9.0 / 16.0);
    assert!(h.plugin.on_volume_key(VolumeKey::Down));
    assert!(h.plugin.on_volume_key(VolumeKey::Down));
    assert_eq!(h.plugin.system_volume(), 7.0 / 16.0);

    assert!(h.plugin.on_key_code(164));
    assert_eq!(h.plugin.system_volume(), 0.0);
    assert_eq!(h.plugin.volume_mute(), 0.0);

    let writes = h.volume.write_count();
    assert!(!h.plugin.on_key_code(66));
    assert_eq!(h.volume.write_count(), writes);
}

#[test]
fn hide_if_playing_suppresses_indicator_while_rendering() {
    let h = harness(0);
    let mut receiver = listen(&h.plugin);
    h.plugin.set_volume_ui_mode(VolumeUiPolicy::HideIfPlaying);

    let id = h.plugin.create_player();
    h.factory.set_playing(id, true);
    h.plugin.volume_up(None);
    assert_eq!(h.volume.last_flags(), Some(VolumeFlags::show_ui(false)));

    h.factory.set_playing(id, false);
    h.plugin.volume_up(None);
    assert_eq!(h.volume.last_flags(), Some(VolumeFlags::show_ui(true)));

    let first = receiver.try_recv().unwrap();
    let second = receiver.try_recv().unwrap();
    assert_eq!(first.get("sui").and_then(EventValue::as_bool), Some(false));
    assert_eq!(second.get("sui").and_then(EventValue::as_bool), Some(true));
}

#[test]
fn unknown_ui_mode_code_keeps_policy() {
    let h = harness(0);

    assert!(h.plugin.set_volume_ui_mode_code(2));
    assert_eq!(h.plugin.volume_ui_mode(), VolumeUiPolicy::NeverShow);
    assert!(!h.plugin.set_volume_ui_mode_code(9));
    assert_eq!(h.plugin.volume_ui_mode(), VolumeUiPolicy::NeverShow);
}

#[test]
fn volume_without_service_degrades_to_zero() {
    let plugin = bootstrap(
        PluginConfig::builder().player_factory(Arc::new(HeadlessPlayerFactory::new())),
    )
    .unwrap();

    assert_eq!(plugin.system_volume(), 0.0);
    assert_eq!(plugin.volume_up(None), 0.0);
    assert_eq!(plugin.volume_set(Some(0.8)), 0.0);
    assert_eq!(plugin.volume_mute(), 0.0);
    assert_eq!(plugin.volume_step(), 1.0 / 16.0);
}

// ============================================================================
// Listener
// ============================================================================

#[test]
fn unload_stops_volume_events_only() {
    let h = harness(0);
    let mut receiver = listen(&h.plugin);
    let id = h.plugin.create_player();

    h.plugin.on_unload();
    assert!(!h.plugin.is_listening());
    h.plugin.volume_set(Some(0.5));
    h.factory
        .host(id)
        .unwrap()
        .publish(EventRecord::new("prepared").with_field("pid", id));

    let record = receiver.try_recv().unwrap();
    assert_eq!(record.event(), "prepared");
    assert!(receiver.try_recv().is_none());

    h.plugin.on_load();
    h.plugin.volume_set(Some(0.25));
    assert_eq!(volume_of(&receiver.try_recv().unwrap()), Some(0.25));
}

#[test]
fn records_published_before_attach_are_flushed_in_order() {
    let h = harness(0);
    h.plugin.on_load();
    h.plugin.volume_set(Some(0.5));
    h.plugin.volume_set(Some(0.75));
    assert_eq!(h.plugin.events().pending_len(), 2);

    let (sink, mut receiver) = event_channel();
    h.plugin.attach_listener(Arc::new(sink));

    assert_eq!(volume_of(&receiver.try_recv().unwrap()), Some(0.5));
    assert_eq!(volume_of(&receiver.try_recv().unwrap()), Some(0.75));
    assert!(receiver.try_recv().is_none());
    assert_eq!(h.plugin.events().pending_len(), 0);
}

#[tokio::test]
async fn detached_listener_stops_receiving() {
    let h = harness(0);
    let mut receiver = listen(&h.plugin).filter(|record| record.event() == VOLUME_EVENT);

    h.plugin.volume_set(Some(0.5));
    assert_eq!(volume_of(&receiver.recv().await.unwrap()), Some(0.5));

    assert!(h.plugin.detach_listener());
    assert!(!h.plugin.detach_listener());
    h.plugin.volume_set(Some(0.25));
    assert!(receiver.try_recv().is_none());
    assert_eq!(h.plugin.events().pending_len(), 1);
}

// ============================================================================
// Audio focus
// ============================================================================

#[test]
fn focus_request_release_and_revocation() {
    let h = harness(0);

    h.plugin.request_audio_focus();
    h.plugin.request_audio_focus();
    assert_eq!(h.plugin.audio_focus_state(), FocusState::Held);
    assert_eq!(h.focus.request_count(), 1);

    assert!(h.focus.revoke(FocusChange::Loss));
    assert_eq!(h.plugin.audio_focus_state(), FocusState::Released);

    h.plugin.release_audio_focus();
    assert_eq!(h.focus.release_count(), 0);
}

#[test]
fn players_share_one_focus_grant() {
    let h = harness(0);
    let a = h.plugin.create_player();
    let b = h.plugin.create_player();

    h.factory.host(a).unwrap().audio_focus(true);
    h.factory.host(b).unwrap().audio_focus(true);
    assert_eq!(h.focus.request_count(), 1);

    h.factory.host(b).unwrap().audio_focus(false);
    assert_eq!(h.plugin.audio_focus_state(), FocusState::Released);
    assert!(!h.focus.is_held());
}

// ============================================================================
// Engine and host window
// ============================================================================

#[test]
fn engine_log_level_maps_host_levels() {
    let h = harness(0);

    assert_eq!(h.plugin.set_engine_log_level(None), 5);
    assert_eq!(h.plugin.set_engine_log_level(Some(250)), 2);
    assert_eq!(h.factory.log_level(), 2);
    assert_eq!(h.plugin.set_engine_log_level(Some(5000)), 8);
    assert_eq!(h.plugin.set_engine_log_level(Some(-100)), 0);
    assert_eq!(h.factory.log_level(), 0);
}

#[test]
fn engine_level_forwarded_once_per_call() {
    let mut factory = MockFactory::new();
    factory
        .expect_set_log_level()
        .with(eq(4))
        .times(1)
        .return_const(());
    factory
        .expect_set_log_level()
        .with(eq(8))
        .times(1)
        .return_const(());

    let plugin = bootstrap(PluginConfig::builder().player_factory(Arc::new(factory))).unwrap();
    assert_eq!(plugin.set_engine_log_level(Some(499)), 4);
    assert_eq!(plugin.set_engine_log_level(Some(i32::MAX)), 8);
}

#[test]
fn configured_log_level_applied_at_startup() {
    let factory = Arc::new(HeadlessPlayerFactory::new());
    bootstrap(
        PluginConfig::builder()
            .player_factory(factory.clone())
            .engine_log_level(3),
    )
    .unwrap();
    assert_eq!(factory.log_level(), 3);
}

#[test]
fn window_pass_throughs_follow_attach_and_detach() {
    let h = harness(0);

    assert!(!h.plugin.is_screen_kept_on());
    assert_eq!(h.plugin.brightness(), 0.0);
    assert!(!h.plugin.set_orientation_portrait());

    let window = Arc::new(HeadlessWindow::new());
    h.plugin.attach_host_window(window.clone(), window.clone());

    h.plugin.set_screen_on(true);
    assert!(h.plugin.is_screen_kept_on());
    h.plugin.set_brightness(0.4);
    assert_eq!(h.plugin.brightness(), 0.4);

    assert!(h.plugin.set_orientation_landscape());
    assert!(!h.plugin.set_orientation_landscape());
    h.plugin.set_orientation_auto();
    assert_eq!(window.orientation(), Orientation::Auto);

    let id = h.plugin.create_player();
    h.factory.host(id).unwrap().set_screen_on(false);
    assert!(!window.is_screen_kept_on());

    h.plugin.detach_host_window();
    assert!(!h.plugin.is_screen_kept_on());
    assert!(!h.plugin.set_orientation_portrait());
    assert_eq!(window.orientation(), Orientation::Auto);
}

#[test]
fn shutdown_releases_players_and_focus() {
    let h = harness(0);
    h.plugin.create_player();
    h.plugin.create_player();
    h.plugin.request_audio_focus();

    assert_eq!(h.plugin.shutdown(), 2);
    assert_eq!(h.plugin.player_count(), 0);
    assert!(h.factory.live_players().is_empty());
    assert_eq!(h.plugin.audio_focus_state(), FocusState::Released);
    assert_eq!(h.focus.release_count(), 1);
}

// ============================================================================
// Listener callbacks and concurrency
// ============================================================================

/// Pulls the volume back to half whenever it is raised above half.
#[derive(Default)]
struct VolumeCap {
    plugin: Mutex<Option<Arc<PlayerPlugin>>>,
    seen: Mutex<Vec<f64>>,
}

impl EventSink for VolumeCap {
    fn deliver(&self, record: &EventRecord) -> bridge_traits::error::Result<()> {
        let Some(vol) = volume_of(record) else {
            return Ok(());
        };
        self.seen.lock().push(vol);
        if vol > 0.5 {
            let plugin = self.plugin.lock().clone();
            if let Some(plugin) = plugin {
                plugin.volume_set(Some(0.5));
            }
        }
        Ok(())
    }
}

#[test]
fn listener_may_change_volume_from_callback() {
    let volume = Arc::new(SoftwareVolume::with_max_steps(16).at_step(8));
    let plugin = Arc::new(
        bootstrap(
            PluginConfig::builder()
                .player_factory(Arc::new(HeadlessPlayerFactory::new()))
                .volume_service(volume.clone())
                .focus_provider(Arc::new(LocalFocusProvider::new()))
                .listening(true),
        )
        .unwrap(),
    );
    let cap = Arc::new(VolumeCap::default());
    *cap.plugin.lock() = Some(plugin.clone());
    plugin.attach_listener(cap.clone());

    let (tx, rx) = mpsc::channel();
    let worker = {
        let plugin = plugin.clone();
        thread::spawn(move || {
            let _ = tx.send(plugin.volume_up(Some(0.25)));
        })
    };

    let raised = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("volume_up blocked while the listener changed the volume");
    worker.join().unwrap();

    assert_eq!(raised, 0.75);
    assert_eq!(plugin.system_volume(), 0.5);
    assert_eq!(volume.current_step().unwrap(), 8);
    assert_eq!(*cap.seen.lock(), vec![0.75, 0.5]);

    cap.plugin.lock().take();
    plugin.detach_listener();
}

#[test]
fn concurrent_volume_steps_publish_in_applied_order() {
    let h = harness(0);
    let mut receiver = listen(&h.plugin);
    let plugin = Arc::new(h.plugin);

    const THREADS: usize = 8;
    let barrier = Arc::new(Barrier::new(THREADS));
    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let plugin = plugin.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                plugin.volume_up(Some(1.0 / 16.0));
                plugin.volume_up(Some(1.0 / 16.0));
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(plugin.system_volume(), 1.0);

    let mut levels = Vec::new();
    while let Some(record) = receiver.try_recv() {
        levels.extend(volume_of(&record));
    }
    assert_eq!(levels.len(), THREADS * 2);
    assert!(
        levels.windows(2).all(|pair| pair[0] < pair[1]),
        "levels out of order: {levels:?}"
    );
    assert_eq!(levels.last(), Some(&1.0));
}
