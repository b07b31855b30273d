//! Listener sink that logs events

use bridge_traits::{error::Result, EventRecord, EventSink};
use tracing::info;

/// Writes every delivered record to `tracing` at info level as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingEventSink {
    fn deliver(&self, record: &EventRecord) -> Result<()> {
        info!(event = record.event(), payload = %record.to_json(), "Player event");
        Ok(())
    }
}
