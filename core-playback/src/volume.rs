//! # System Volume Controller
//!
//! Normalized `[0, 1]` volume API over the platform's stepped media volume.
//!
//! ## Quantization
//!
//! Every change is converted to a whole platform step and back:
//!
//! ```text
//! target = clamp(level, 0, 1)
//! step   = clamp(round(target * max), 0, max)
//! result = step / max
//! ```
//!
//! so the returned level always matches what the platform actually applied.
//! `max` is re-read on every change; a `max` of zero or less is treated as an
//! unavailable service.
//!
//! ## Volume events
//!
//! A successful change publishes one `"volume"` record (`vol`, `sui`) through
//! the [`EventBridge`], but only while the listener has opted in via
//! [`set_listening`](VolumeController::set_listening). Without the opt-in the
//! record is dropped, not buffered.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{CapabilitySlot, EventRecord, VolumeFlags, VolumeService, VolumeUiPolicy};
use core_runtime::config::validate_volume_step;
use core_runtime::events::EventBridge;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Finest step used when no step size was configured.
pub const MIN_DEFAULT_STEP: f32 = 1.0 / 16.0;

/// O(1) view of how many players are playable and playing.
pub trait ActivityCounts: Send + Sync {
    fn playable_count(&self) -> usize;
    fn playing_count(&self) -> usize;
}

enum Target {
    Level(f32),
    Delta(f32),
}

pub struct VolumeController {
    service: CapabilitySlot<dyn VolumeService>,
    activity: Arc<dyn ActivityCounts>,
    events: EventBridge,
    policy: RwLock<VolumeUiPolicy>,
    step: RwLock<Option<f32>>,
    listening: AtomicBool,
    /// Serializes read-modify-write of the platform level and queuing its record.
    apply_lock: Mutex<()>,
}

impl VolumeController {
    pub fn new(
        service: CapabilitySlot<dyn VolumeService>,
        activity: Arc<dyn ActivityCounts>,
        events: EventBridge,
    ) -> Self {
        Self {
            service,
            activity,
            events,
            policy: RwLock::new(VolumeUiPolicy::default()),
            step: RwLock::new(None),
            listening: AtomicBool::new(false),
            apply_lock: Mutex::new(()),
        }
    }

    /// Current platform level in `[0, 1]`; `0.0` when the service is
    /// unavailable or fails.
    pub fn current_level(&self) -> f32 {
        match self.service.get() {
            Some(service) => level_of(service.as_ref()),
            None => 0.0,
        }
    }

    /// Move to an absolute level. Returns the level actually applied.
    pub fn set_level(&self, target: f32) -> f32 {
        self.apply(Target::Level(target))
    }

    /// Move by `delta` from the current level. Returns the level actually
    /// applied.
    pub fn adjust(&self, delta: f32) -> f32 {
        self.apply(Target::Delta(delta))
    }

    /// Set the level to zero. Always returns `0.0`.
    pub fn mute(&self) -> f32 {
        self.apply(Target::Level(0.0));
        0.0
    }

    /// Whether the platform indicator should be shown for a change made now.
    pub fn should_show_ui(&self) -> bool {
        self.policy().show_ui(
            self.activity.playable_count(),
            self.activity.playing_count(),
        )
    }

    pub fn policy(&self) -> VolumeUiPolicy {
        *self.policy.read()
    }

    pub fn set_policy(&self, policy: VolumeUiPolicy) {
        *self.policy.write() = policy;
        debug!(?policy, "Volume UI policy set");
    }

    /// Step used by up/down when the caller gives none.
    ///
    /// The configured size, or one platform step but never finer than
    /// [`MIN_DEFAULT_STEP`].
    pub fn step_size(&self) -> f32 {
        if let Some(step) = *self.step.read() {
            return step;
        }

        let max = self
            .service
            .get()
            .and_then(|service| service.max_steps().ok())
            .filter(|max| *max > 0);

        match max {
            Some(max) => (1.0 / max as f32).max(MIN_DEFAULT_STEP),
            None => MIN_DEFAULT_STEP,
        }
    }

    /// Override the step size, or return to the derived default with `None`.
    ///
    /// Sizes outside `(0, 1]` are rejected and leave the current setting.
    pub fn set_step_size(&self, step: Option<f32>) -> bool {
        if let Some(size) = step {
            if let Err(err) = validate_volume_step(size) {
                warn!(error = %err, "Ignoring volume step");
                return false;
            }
        }
        *self.step.write() = step;
        true
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    pub fn set_listening(&self, listening: bool) {
        self.listening.store(listening, Ordering::SeqCst);
    }

    fn apply(&self, target: Target) -> f32 {
        let level = self.apply_locked(target);
        // Deliver after the apply lock is gone so a listener may change the
        // volume again from inside its callback.
        self.events.flush();
        level
    }

    /// Change the platform step and queue the matching record, serialized
    /// against other changes so records follow the order of applied levels.
    fn apply_locked(&self, target: Target) -> f32 {
        let _apply = self.apply_lock.lock();

        let Some(service) = self.service.get() else {
            debug!("No volume service available; volume change ignored");
            return 0.0;
        };

        let max = match service.max_steps() {
            Ok(max) if max > 0 => max,
            Ok(max) => {
                debug!(max, "Volume service reports no steps; volume change ignored");
                return 0.0;
            }
            Err(err) => {
                warn!(error = %err, "Failed to read max volume steps");
                return 0.0;
            }
        };

        let target = match target {
            Target::Level(level) => level,
            Target::Delta(delta) => level_of(service.as_ref()) + delta,
        };
        let step = quantize(target, max);
        let show_ui = self.should_show_ui();

        if let Err(err) = service.set_step(step, VolumeFlags::show_ui(show_ui)) {
            warn!(error = %err, step, max, "Failed to apply volume step");
            return level_of(service.as_ref());
        }

        let level = step as f32 / max as f32;
        debug!(step, max, level, show_ui, "Volume applied");

        if self.is_listening() {
            self.events.enqueue(EventRecord::volume(level, show_ui));
        }

        level
    }
}

impl fmt::Debug for VolumeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VolumeController")
            .field("service", &self.service)
            .field("policy", &self.policy())
            .field("step", &*self.step.read())
            .field("listening", &self.is_listening())
            .finish()
    }
}

/// Nearest whole step for `target` (NaN counts as 0).
fn quantize(target: f32, max: i32) -> i32 {
    let target = if target.is_nan() {
        0.0
    } else {
        target.clamp(0.0, 1.0)
    };
    ((target * max as f32).round() as i32).clamp(0, max)
}

fn level_of(service: &dyn VolumeService) -> f32 {
    match read_steps(service) {
        Ok(Some((current, max))) => current.clamp(0, max) as f32 / max as f32,
        Ok(None) => 0.0,
        Err(err) => {
            warn!(error = %err, "Failed to read volume level");
            0.0
        }
    }
}

fn read_steps(service: &dyn VolumeService) -> BridgeResult<Option<(i32, i32)>> {
    let max = service.max_steps()?;
    if max <= 0 {
        return Ok(None);
    }
    Ok(Some((service.current_step()?, max)))
}
