//! # Event Bridge
//!
//! The single outbound path from the core to its external listener.
//!
//! ## Overview
//!
//! The host's event channel attaches asynchronously, often after the core has
//! already produced events (a player created during startup reports its
//! first state flips before anyone listens). The bridge therefore buffers
//! records while no listener is attached and flushes them, in order, the
//! moment one attaches. After that records are delivered on the publishing
//! thread, outside the bridge lock.
//!
//! ```text
//!                       ┌──────────────────────────────┐
//!  publish(record) ────>│ EventBridge                  │
//!                       │   pending (FIFO)             │
//!                       │      │                       │
//!                       │   listener? ── yes ──────────┼──> EventSink::deliver
//!                       │      │                       │    (one drainer at a time)
//!                       │      no ── attach ───────────┼──> flushed in order
//!                       └──────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - Records observed by one listener arrive in exactly the order `publish`
//!   was called, across the buffered and the live path combined.
//! - Nothing is dropped while no listener is attached. The buffer is bounded
//!   only by memory.
//! - A listener failure (error or panic) is logged and swallowed. The record
//!   is not retried and the bridge state is unaffected.
//! - Replacing a listener does not replay records already delivered.
//! - One thread delivers at a time. A record published while another thread
//!   (or the listener itself, from inside `deliver`) is delivering is queued
//!   and handed over by that delivery loop, so a listener may call back into
//!   the core.
//!
//! ## Async consumers
//!
//! [`event_channel`] returns a [`ChannelSink`] to attach plus an
//! [`EventReceiver`] that yields the records on a tokio task:
//!
//! ```
//! use bridge_traits::EventRecord;
//! use core_runtime::events::{event_channel, EventBridge};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bridge = EventBridge::new();
//! bridge.publish(EventRecord::volume(0.5, true));
//!
//! let (sink, mut receiver) = event_channel();
//! bridge.attach(Arc::new(sink));
//!
//! let record = receiver.recv().await.unwrap();
//! assert_eq!(record.event(), "volume");
//! # }
//! ```

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BridgeError, EventRecord, EventSink};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

// ============================================================================
// Event Bridge
// ============================================================================

/// Buffering relay between event producers and the attached listener.
///
/// Cheap to clone; clones share the same listener and buffer.
#[derive(Clone, Default)]
pub struct EventBridge {
    state: Arc<Mutex<BridgeState>>,
}

#[derive(Default)]
struct BridgeState {
    listener: Option<Arc<dyn EventSink>>,
    pending: VecDeque<EventRecord>,
    /// Some thread is currently handing `pending` to the listener.
    draining: bool,
}

impl EventBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `listener` and flush every pending record to it.
    ///
    /// Replaces any previously attached listener.
    pub fn attach(&self, listener: Arc<dyn EventSink>) {
        let mut state = self.state.lock();
        let flushed = state.pending.len();
        let replaced = state.listener.replace(listener).is_some();
        drop(state);

        debug!(flushed, replaced, "Event listener attached");
        self.flush();
    }

    /// Remove the listener. Later records are buffered again.
    ///
    /// Returns `true` if a listener was attached.
    pub fn detach(&self) -> bool {
        let detached = self.state.lock().listener.take().is_some();
        if detached {
            debug!("Event listener detached");
        }
        detached
    }

    /// Deliver `record`, or buffer it until a listener attaches.
    pub fn publish(&self, record: EventRecord) {
        self.enqueue(record);
        self.flush();
    }

    /// Queue `record` behind everything published so far without delivering
    /// it. A later [`flush`](Self::flush) or `publish` hands it over.
    pub fn enqueue(&self, record: EventRecord) {
        let mut state = self.state.lock();
        if state.listener.is_none() {
            trace!(event = record.event(), "Buffering event until a listener attaches");
        }
        state.pending.push_back(record);
    }

    /// Hand queued records to the listener, in order, outside the bridge lock.
    ///
    /// Returns immediately if no listener is attached or another call is
    /// already delivering; that call picks up the queued records.
    pub fn flush(&self) {
        {
            let mut state = self.state.lock();
            if state.draining || state.listener.is_none() {
                return;
            }
            state.draining = true;
        }

        loop {
            let (listener, record) = {
                let mut state = self.state.lock();
                let next = match state.listener.clone() {
                    Some(listener) => state.pending.pop_front().map(|record| (listener, record)),
                    None => None,
                };
                match next {
                    Some(next) => next,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };
            deliver(listener.as_ref(), &record);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.state.lock().listener.is_some()
    }

    /// Number of records waiting for a listener.
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }
}

impl fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EventBridge")
            .field("attached", &state.listener.is_some())
            .field("pending", &state.pending.len())
            .field("draining", &state.draining)
            .finish()
    }
}

fn deliver(listener: &dyn EventSink, record: &EventRecord) {
    match panic::catch_unwind(AssertUnwindSafe(|| listener.deliver(record))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(event = record.event(), error = %err, "Listener rejected event; dropping it");
        }
        Err(_) => {
            warn!(event = record.event(), "Listener panicked while delivering event; dropping it");
        }
    }
}

// ============================================================================
// Channel-backed listener
// ============================================================================

/// Type alias for record filter functions.
type RecordFilter = Box<dyn Fn(&EventRecord) -> bool + Send + Sync>;

/// Create a listener that forwards records into an unbounded tokio channel.
pub fn event_channel() -> (ChannelSink, EventReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        ChannelSink { sender },
        EventReceiver {
            receiver,
            filter: None,
        },
    )
}

/// [`EventSink`] feeding an [`EventReceiver`].
///
/// Delivery fails with [`BridgeError::Disconnected`] once the receiver is
/// dropped.
#[derive(Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<EventRecord>,
}

impl EventSink for ChannelSink {
    fn deliver(&self, record: &EventRecord) -> BridgeResult<()> {
        self.sender
            .send(record.clone())
            .map_err(|_| BridgeError::Disconnected("event receiver dropped".to_string()))
    }
}

impl fmt::Debug for ChannelSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSink")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

/// Async end of [`event_channel`].
pub struct EventReceiver {
    receiver: mpsc::UnboundedReceiver<EventRecord>,
    filter: Option<RecordFilter>,
}

impl EventReceiver {
    /// Only yield records matching `predicate`; others are skipped.
    ///
    /// ```
    /// use core_runtime::events::event_channel;
    ///
    /// let (_sink, receiver) = event_channel();
    /// let volume_only = receiver.filter(|record| record.event() == "volume");
    /// ```
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&EventRecord) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Wait for the next matching record. Returns `None` once every
    /// [`ChannelSink`] is gone and the channel is drained.
    pub async fn recv(&mut self) -> Option<EventRecord> {
        loop {
            let record = self.receiver.recv().await?;
            if self.matches(&record) {
                return Some(record);
            }
        }
    }

    /// Take the next matching record if one is already queued.
    pub fn try_recv(&mut self) -> Option<EventRecord> {
        loop {
            let record = self.receiver.try_recv().ok()?;
            if self.matches(&record) {
                return Some(record);
            }
        }
    }

    fn matches(&self, record: &EventRecord) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(record))
    }
}

impl fmt::Debug for EventReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventReceiver")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
