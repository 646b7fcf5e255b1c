//! Types for the watch api
//!
//! A watch response is a stream of newline separated JSON objects of the form
//! `{"type": "ADDED", "object": {...}}`.
//! See <https://kubernetes.io/docs/reference/using-api/api-concepts/#efficient-detection-of-changes>
use std::fmt::Debug;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ErrorResponse;

/// A change notification from a watch
#[derive(Clone, PartialEq)]
pub enum WatchEvent<K = Value> {
    /// Resource was added
    Added(K),
    /// Resource was modified
    Modified(K),
    /// Resource was deleted
    Deleted(K),
}

impl<K> WatchEvent<K> {
    /// The object carried by the event
    pub fn object(&self) -> &K {
        match self {
            WatchEvent::Added(obj) | WatchEvent::Modified(obj) | WatchEvent::Deleted(obj) => obj,
        }
    }

    /// Take the object out of the event
    pub fn into_object(self) -> K {
        match self {
            WatchEvent::Added(obj) | WatchEvent::Modified(obj) | WatchEvent::Deleted(obj) => obj,
        }
    }
}

impl<K> Debug for WatchEvent<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self {
            WatchEvent::Added(_) => write!(f, "Added event"),
            WatchEvent::Modified(_) => write!(f, "Modified event"),
            WatchEvent::Deleted(_) => write!(f, "Deleted event"),
        }
    }
}

/// One decoded line of a watch response
#[derive(Debug, Clone, PartialEq)]
pub enum WatchLine {
    /// An add, modify or delete notification
    Event(WatchEvent),
    /// The server reported an error and is about to close the stream
    Error(ErrorResponse),
    /// An event type this client does not handle, e.g. `BOOKMARK`
    Other(String),
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    type_: String,
    #[serde(default)]
    object: Value,
}

impl WatchLine {
    /// Decode one line of a watch response
    ///
    /// Fails when the line is not a JSON object with a string `type`,
    /// or when an `ERROR` line does not carry a `Status`.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        Self::parse_bytes(line.as_bytes())
    }

    /// Decode one raw line of a watch response
    ///
    /// Invalid UTF-8 inside the line is a decode error like any other.
    pub fn parse_bytes(line: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawEvent = serde_json::from_slice(line)?;
        Ok(match raw.type_.as_str() {
            "ADDED" => WatchLine::Event(WatchEvent::Added(raw.object)),
            "MODIFIED" => WatchLine::Event(WatchEvent::Modified(raw.object)),
            "DELETED" => WatchLine::Event(WatchEvent::Deleted(raw.object)),
            "ERROR" => WatchLine::Error(serde_json::from_value(raw.object)?),
            _ => WatchLine::Other(raw.type_),
        })
    }
}
