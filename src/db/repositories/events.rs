use anyhow::Result;
use rusqlite::{params, Connection};

use crate::db::{
    helpers::{parse_datetime, parse_kind, to_u32},
    Database,
};
use crate::models::{EventRecord, SessionEvent};

pub(crate) fn events_for_session(conn: &Connection, session_id: &str) -> Result<Vec<SessionEvent>> {
    let mut stmt = conn.prepare(
        "SELECT kind, timestamp, probability
         FROM events
         WHERE session_id = ?1
         ORDER BY timestamp ASC, id ASC",
    )?;

    let mut rows = stmt.query(params![session_id])?;
    let mut events = Vec::new();
    while let Some(row) = rows.next()? {
        let kind: String = row.get("kind")?;
        let timestamp: String = row.get("timestamp")?;
        let probability: i64 = row.get("probability")?;
        events.push(SessionEvent {
            kind: parse_kind(&kind)?,
            timestamp: parse_datetime(&timestamp, "timestamp")?,
            probability: to_u32(probability, "probability")?,
        });
    }

    Ok(events)
}

impl Database {
    /// Returns `false` when the referenced session does not exist.
    pub async fn insert_event(&self, record: &EventRecord) -> Result<bool> {
        let record = record.clone();
        self.execute(move |conn| {
            let known: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sessions WHERE id = ?1)",
                params![record.session_id],
                |row| row.get(0),
            )?;
            if !known {
                return Ok(false);
            }

            conn.execute(
                "INSERT INTO events (session_id, kind, timestamp, probability)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.session_id,
                    record.kind.as_str(),
                    record.timestamp.to_rfc3339(),
                    record.probability,
                ],
            )?;
            Ok(true)
        })
        .await
    }
}
