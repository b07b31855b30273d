//! Host window pass-throughs: keep-awake, brightness and orientation.
//!
//! These are thin wrappers over OS window APIs. They hold no state of their
//! own and only exist while a host window is attached.

/// Screen keep-awake and brightness controls of the attached window.
pub trait ScreenControl: Send + Sync {
    fn set_keep_screen_on(&self, on: bool);

    fn is_screen_kept_on(&self) -> bool;

    /// Window brightness in `0.0..=1.0`, falling back to the system setting.
    fn brightness(&self) -> f32;

    fn set_brightness(&self, brightness: f32);
}

/// Requested orientation of the attached window.
pub trait OrientationControl: Send + Sync {
    /// Switch to portrait. Returns `true` if the orientation actually changed.
    fn set_portrait(&self) -> bool;

    /// Switch to landscape. Returns `true` if the orientation actually changed.
    fn set_landscape(&self) -> bool;

    /// Follow the sensor again.
    fn set_auto(&self);
}
