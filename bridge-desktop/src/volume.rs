//! Software volume implementation

use bridge_traits::{
    error::{BridgeError, Result},
    VolumeFlags, VolumeService,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use tracing::debug;

/// Stepped volume level kept in memory.
///
/// Mirrors a platform media stream: `0..=max_steps` integer steps. Writes
/// outside that range are clamped.
#[derive(Debug)]
pub struct SoftwareVolume {
    max_steps: i32,
    current: AtomicI32,
    last_flags: Mutex<Option<VolumeFlags>>,
    writes: AtomicUsize,
}

impl SoftwareVolume {
    pub const DEFAULT_MAX_STEPS: i32 = 16;

    /// Volume with [`DEFAULT_MAX_STEPS`](Self::DEFAULT_MAX_STEPS) steps, starting at half.
    pub fn new() -> Self {
        Self::with_max_steps(Self::DEFAULT_MAX_STEPS)
    }

    /// A `max_steps` of zero or less models a stream without adjustable volume.
    pub fn with_max_steps(max_steps: i32) -> Self {
        Self {
            max_steps,
            current: AtomicI32::new(max_steps.max(0) / 2),
            last_flags: Mutex::new(None),
            writes: AtomicUsize::new(0),
        }
    }

    /// Set the starting step without counting a write.
    pub fn at_step(self, step: i32) -> Self {
        self.current
            .store(step.clamp(0, self.max_steps.max(0)), Ordering::SeqCst);
        self
    }

    /// Flags passed with the most recent successful write.
    pub fn last_flags(&self) -> Option<VolumeFlags> {
        *self.last_flags.lock()
    }

    /// Number of successful `set_step` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Default for SoftwareVolume {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeService for SoftwareVolume {
    fn max_steps(&self) -> Result<i32> {
        Ok(self.max_steps)
    }

    fn current_step(&self) -> Result<i32> {
        Ok(self.current.load(Ordering::SeqCst))
    }

    fn set_step(&self, step: i32, flags: VolumeFlags) -> Result<()> {
        if self.max_steps <= 0 {
            return Err(BridgeError::NotAvailable(
                "software volume has no adjustable steps".to_string(),
            ));
        }

        let clamped = step.clamp(0, self.max_steps);
        self.current.store(clamped, Ordering::SeqCst);
        *self.last_flags.lock() = Some(flags);
        self.writes.fetch_add(1, Ordering::SeqCst);

        debug!(
            step = clamped,
            max = self.max_steps,
            show_ui = flags.show_ui,
            "Software volume set"
        );
        Ok(())
    }
}
