//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the player control plane:
//! - Event bridge buffering records until the listener attaches
//! - Plugin configuration builder
//! - Logging and tracing setup with host log forwarding
//!
//! ## Overview
//!
//! Nothing in this crate knows about players, volume or focus. It provides
//! the single outbound path from the core ([`EventBridge`](events::EventBridge)),
//! the validated configuration the façade is built from, and the `tracing`
//! subscriber wiring.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
