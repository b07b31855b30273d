//! Outbound event records and the listener sink contract.
//!
//! An [`EventRecord`] is the unit of communication from the core to the single
//! external listener: an event name plus an ordered list of fields. Records
//! are assembled with the consuming builder methods and are immutable once
//! handed to the bridge.

use crate::{error::Result, PlayerId};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Value of a single event field.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl EventValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EventValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EventValue::Float(v) => Some(*v),
            EventValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            EventValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            EventValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl Serialize for EventValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            EventValue::Bool(v) => serializer.serialize_bool(*v),
            EventValue::Int(v) => serializer.serialize_i64(*v),
            EventValue::Float(v) => serializer.serialize_f64(*v),
            EventValue::Text(v) => serializer.serialize_str(v),
        }
    }
}

impl From<bool> for EventValue {
    fn from(value: bool) -> Self {
        EventValue::Bool(value)
    }
}

impl From<i32> for EventValue {
    fn from(value: i32) -> Self {
        EventValue::Int(value as i64)
    }
}

impl From<i64> for EventValue {
    fn from(value: i64) -> Self {
        EventValue::Int(value)
    }
}

impl From<u64> for EventValue {
    fn from(value: u64) -> Self {
        EventValue::Int(value as i64)
    }
}

impl From<f32> for EventValue {
    fn from(value: f32) -> Self {
        EventValue::Float(value as f64)
    }
}

impl From<f64> for EventValue {
    fn from(value: f64) -> Self {
        EventValue::Float(value)
    }
}

impl From<&str> for EventValue {
    fn from(value: &str) -> Self {
        EventValue::Text(value.to_string())
    }
}

impl From<String> for EventValue {
    fn from(value: String) -> Self {
        EventValue::Text(value)
    }
}

impl From<PlayerId> for EventValue {
    fn from(value: PlayerId) -> Self {
        EventValue::Int(value.as_u64() as i64)
    }
}

/// Name of the record published on every system volume change.
pub const VOLUME_EVENT: &str = "volume";

/// Ordered key/value payload delivered to the listener.
///
/// Serializes to a flat map whose first key is `"event"`, followed by the
/// fields in insertion order:
///
/// ```
/// use bridge_traits::EventRecord;
///
/// let record = EventRecord::new("volume").with_field("sui", true).with_field("vol", 0.5f32);
/// let json = serde_json::to_string(&record).unwrap();
/// assert_eq!(json, r#"{"event":"volume","sui":true,"vol":0.5}"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    event: String,
    fields: Vec<(String, EventValue)>,
}

impl EventRecord {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field. Setting a key twice replaces the earlier value in place.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<EventValue>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    /// Build the `"volume"` record carried on every level change.
    pub fn volume(level: f32, show_ui: bool) -> Self {
        Self::new(VOLUME_EVENT)
            .with_field("sui", show_ui)
            .with_field("vol", level)
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn get(&self, key: &str) -> Option<&EventValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &EventValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for EventRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("event", &self.event)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// The single external consumer of core events.
///
/// Called without any core lock held, one record at a time. `deliver` may
/// call back into the core; records produced that way are delivered after it
/// returns. A returned error is logged and dropped by the bridge; the record
/// is not retried.
pub trait EventSink: Send + Sync {
    fn deliver(&self, record: &EventRecord) -> Result<()>;
}
