//! Session records as the session backend exchanges them.
//!
//! Field names on the wire follow the backend (`fechaInicio`, `nivelMax`, ...);
//! the Rust side uses the English names throughout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::EventKind;

/// Summary submitted when a session is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(rename = "fechaFin")]
    pub ended_at: DateTime<Utc>,
    #[serde(rename = "duracion")]
    pub duration_seconds: i64,
    #[serde(rename = "nivelMax")]
    pub max_level: u32,
    #[serde(rename = "promedio")]
    pub mean_probability: u32,
    #[serde(rename = "eventosTotales")]
    pub total_events: u64,
}

/// An event as returned by the session detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    #[serde(rename = "tipo")]
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "probabilidad")]
    pub probability: u32,
}

/// A monitoring session. Summary fields are only populated once finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "fechaInicio")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "fechaFin", default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(rename = "duracion", default)]
    pub duration_seconds: Option<i64>,
    #[serde(rename = "nivelMax", default)]
    pub max_level: Option<u32>,
    #[serde(rename = "promedio", default)]
    pub mean_probability: Option<u32>,
    #[serde(rename = "eventosTotales", default)]
    pub total_events: Option<u64>,
    #[serde(rename = "eventos", default)]
    pub events: Vec<SessionEvent>,
}

impl Session {
    pub fn is_finalized(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// Session ids arrive either as JSON strings or as integers depending on the
/// backend's storage; both are normalized to a string.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}
