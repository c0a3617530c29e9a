use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of classified events. Serialized names are the ones the
/// session backend stores, so local and remote logs share one vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "parpadeo")]
    Blink,
    #[serde(rename = "microsueño moderado")]
    ModerateMicrosleep,
    #[serde(rename = "microsueño crítico")]
    CriticalMicrosleep,
    #[serde(rename = "bostezo")]
    Yawn,
    #[serde(rename = "sin eventos (1min)")]
    IdleDecay,
    #[serde(rename = "parpadeos elevados")]
    ElevatedBlinks,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Blink,
        EventKind::ModerateMicrosleep,
        EventKind::CriticalMicrosleep,
        EventKind::Yawn,
        EventKind::IdleDecay,
        EventKind::ElevatedBlinks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Blink => "parpadeo",
            EventKind::ModerateMicrosleep => "microsueño moderado",
            EventKind::CriticalMicrosleep => "microsueño crítico",
            EventKind::Yawn => "bostezo",
            EventKind::IdleDecay => "sin eventos (1min)",
            EventKind::ElevatedBlinks => "parpadeos elevados",
        }
    }

    pub fn is_microsleep(&self) -> bool {
        matches!(
            self,
            EventKind::ModerateMicrosleep | EventKind::CriticalMicrosleep
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locally recorded event. The local list is authoritative for in-session
/// summaries; the remote copy is best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub probability_snapshot: u32,
}

/// Append-only score change log entry (post-update value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub value: u32,
}

/// Wire body of the remote "append event" call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "tipo")]
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "probabilidad")]
    pub probability: u32,
    #[serde(rename = "sesionId")]
    pub session_id: String,
}

impl EventRecord {
    pub fn from_event(event: &Event, session_id: &str) -> Self {
        Self {
            kind: event.kind,
            timestamp: event.timestamp,
            probability: event.probability_snapshot.min(100),
            session_id: session_id.to_string(),
        }
    }
}
