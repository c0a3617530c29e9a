//! Append-only record of classified events.
//!
//! The local list is written synchronously and is what session summaries are
//! computed from. When a session is attached, each append is also handed to the
//! remote forwarder as a message; the sample path never waits on it.

pub mod forwarder;

pub use forwarder::{spawn_forwarder, EventSender};

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::models::{Event, EventKind, EventRecord};

struct RemoteMirror {
    session_id: String,
    sender: EventSender,
}

#[derive(Default)]
pub struct EventLedger {
    events: Vec<Event>,
    mirror: Option<RemoteMirror>,
}

impl EventLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start mirroring appends to the remote store under `session_id`.
    pub fn attach(&mut self, session_id: String, sender: EventSender) {
        self.mirror = Some(RemoteMirror { session_id, sender });
    }

    pub fn session_id(&self) -> Option<&str> {
        self.mirror.as_ref().map(|mirror| mirror.session_id.as_str())
    }

    pub fn record(&mut self, kind: EventKind, probability: u32, at: DateTime<Utc>) -> Event {
        let event = Event {
            kind,
            timestamp: at,
            probability_snapshot: probability,
        };
        self.events.push(event.clone());

        match &self.mirror {
            Some(mirror) => {
                let record = EventRecord::from_event(&event, &mirror.session_id);
                if mirror.sender.send(record).is_err() {
                    warn!("event forwarder closed; {kind} kept locally only");
                }
            }
            None => debug!("no session attached; {kind} kept locally only"),
        }

        event
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drops local events and the remote attachment.
    pub fn clear(&mut self) {
        self.events.clear();
        self.mirror = None;
    }
}
