//! # Host Bridge Traits
//!
//! Capability contracts between the player control plane and the host
//! platform it is embedded in.
//!
//! ## Overview
//!
//! The core tracks player instances, arbitrates audio focus and system volume
//! across them, and relays events to a single listener. Everything that
//! touches the operating system is expressed here as a trait the host
//! implements per platform (Android, iOS, desktop).
//!
//! ## Traits
//!
//! ### Audio
//! - [`VolumeService`](volume::VolumeService) - Stepped media-stream volume
//! - [`FocusProvider`](focus::FocusProvider) - System audio-focus grants
//!
//! ### Players
//! - [`PlayerFactory`](player::PlayerFactory) - Constructs decode/render engine instances
//! - [`PlayerHost`](player::PlayerHost) - Services the core offers each instance
//!
//! ### Events & Diagnostics
//! - [`EventSink`](event::EventSink) - The external listener of core events
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ### Window pass-throughs
//! - [`ScreenControl`](display::ScreenControl) - Keep-awake and brightness
//! - [`OrientationControl`](display::OrientationControl) - Portrait/landscape switching
//!
//! ## Missing capabilities
//!
//! Capabilities are optional. The core looks them up through a
//! [`CapabilitySlot`](capability::CapabilitySlot) on every call and degrades
//! to a neutral default when one is absent: volume queries report `0.0`,
//! focus requests become no-ops, window queries report `false`/`0.0`.
//!
//! ## Error Handling
//!
//! Capability calls return [`BridgeError`](error::BridgeError). The core logs
//! these and falls back; they never reach the upward API.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`. Host callbacks (focus changes, player
//! state flips) may arrive from any thread.

pub mod capability;
pub mod display;
pub mod error;
pub mod event;
pub mod focus;
pub mod log;
pub mod player;
pub mod volume;

pub use error::BridgeError;

pub use capability::CapabilitySlot;
pub use display::{OrientationControl, ScreenControl};
pub use event::{EventRecord, EventSink, EventValue, VOLUME_EVENT};
pub use focus::{FocusChange, FocusChangeListener, FocusGrant, FocusProvider, FocusResponse};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use player::{PlayerFactory, PlayerHost, PlayerId, PlayerInstance};
pub use volume::{VolumeFlags, VolumeService, VolumeUiPolicy};
