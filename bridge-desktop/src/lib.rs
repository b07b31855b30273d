//! # Desktop Bridge Implementations
//!
//! In-process implementations of the bridge traits for desktop hosts,
//! headless services and tests.
//!
//! ## Overview
//!
//! Desktop targets have no system-wide stepped media volume or audio-focus
//! arbiter that the plugin could borrow, so this crate models them inside
//! the process:
//! - `VolumeService` as a software mixer level ([`SoftwareVolume`])
//! - `FocusProvider` granting focus to one holder at a time ([`LocalFocusProvider`])
//! - `PlayerFactory` producing engine-less players driven by the caller ([`HeadlessPlayerFactory`])
//! - `ScreenControl`/`OrientationControl` on a virtual window ([`HeadlessWindow`])
//! - `EventSink` writing every record to `tracing` ([`TracingEventSink`])
//!
//! `core-runtime` injects [`HeadlessPlayerFactory`] when the `desktop-shims`
//! feature is enabled and no factory was configured.
//!
//! ## Usage
//!
//! ```
//! use bridge_desktop::{LocalFocusProvider, SoftwareVolume};
//! use bridge_traits::{VolumeFlags, VolumeService};
//!
//! let volume = SoftwareVolume::new();
//! volume.set_step(8, VolumeFlags::show_ui(false)).unwrap();
//! assert_eq!(volume.current_step().unwrap(), 8);
//!
//! let focus = LocalFocusProvider::new();
//! assert!(!focus.is_held());
//! ```

mod events;
mod focus;
mod player;
mod volume;
mod window;

pub use events::TracingEventSink;
pub use focus::LocalFocusProvider;
pub use player::{HeadlessPlayerFactory, DEFAULT_ENGINE_LOG_LEVEL};
pub use volume::SoftwareVolume;
pub use window::{HeadlessWindow, Orientation};
