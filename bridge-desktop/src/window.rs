//! Virtual host window

use bridge_traits::{OrientationControl, ScreenControl};
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Auto,
    Portrait,
    Landscape,
}

/// In-memory window implementing the screen and orientation pass-throughs.
#[derive(Debug)]
pub struct HeadlessWindow {
    state: Mutex<WindowState>,
}

#[derive(Debug)]
struct WindowState {
    keep_on: bool,
    brightness: f32,
    orientation: Orientation,
}

impl HeadlessWindow {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WindowState {
                keep_on: false,
                brightness: 1.0,
                orientation: Orientation::Auto,
            }),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.state.lock().orientation
    }

    fn switch_to(&self, orientation: Orientation) -> bool {
        let mut state = self.state.lock();
        if state.orientation == orientation {
            return false;
        }
        debug!(from = ?state.orientation, to = ?orientation, "Window orientation changed");
        state.orientation = orientation;
        true
    }
}

impl Default for HeadlessWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenControl for HeadlessWindow {
    fn set_keep_screen_on(&self, on: bool) {
        self.state.lock().keep_on = on;
    }

    fn is_screen_kept_on(&self) -> bool {
        self.state.lock().keep_on
    }

    fn brightness(&self) -> f32 {
        self.state.lock().brightness
    }

    fn set_brightness(&self, brightness: f32) {
        let brightness = if brightness.is_nan() {
            0.0
        } else {
            brightness.clamp(0.0, 1.0)
        };
        self.state.lock().brightness = brightness;
    }
}

impl OrientationControl for HeadlessWindow {
    fn set_portrait(&self) -> bool {
        self.switch_to(Orientation::Portrait)
    }

    fn set_landscape(&self) -> bool {
        self.switch_to(Orientation::Landscape)
    }

    fn set_auto(&self) {
        self.switch_to(Orientation::Auto);
    }
}
