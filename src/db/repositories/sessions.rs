use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::events::events_for_session;
use crate::db::{
    helpers::{parse_datetime, parse_optional_datetime, to_i64, to_u32, to_u64},
    Database,
};
use crate::models::{Session, SessionSummary};

const SESSION_COLUMNS: &str =
    "id, started_at, ended_at, duration_seconds, max_level, mean_probability, total_events";

/// Result of asking the store for a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened(String),
    AlreadyActive(String),
}

fn row_to_session(row: &Row) -> Result<Session> {
    let started_at: String = row.get("started_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;
    let duration_seconds: Option<i64> = row.get("duration_seconds")?;
    let max_level: Option<i64> = row.get("max_level")?;
    let mean_probability: Option<i64> = row.get("mean_probability")?;
    let total_events: Option<i64> = row.get("total_events")?;

    Ok(Session {
        id: row.get("id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_optional_datetime(ended_at, "ended_at")?,
        duration_seconds,
        max_level: max_level.map(|v| to_u32(v, "max_level")).transpose()?,
        mean_probability: mean_probability
            .map(|v| to_u32(v, "mean_probability"))
            .transpose()?,
        total_events: total_events
            .map(|v| to_u64(v, "total_events"))
            .transpose()?,
        events: Vec::new(),
    })
}

fn find_session(conn: &Connection, session_id: &str) -> Result<Option<Session>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
    ))?;
    let mut rows = stmt.query(params![session_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_session(row)?)),
        None => Ok(None),
    }
}

impl Database {
    /// Opens a session unless one is still running, in which case its id is
    /// returned instead.
    pub async fn open_session(&self, started_at: DateTime<Utc>) -> Result<OpenOutcome> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let active: Option<String> = tx
                .query_row(
                    "SELECT id FROM sessions
                     WHERE ended_at IS NULL
                     ORDER BY started_at DESC
                     LIMIT 1",
                    [],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(id) = active {
                return Ok(OpenOutcome::AlreadyActive(id));
            }

            let id = Uuid::new_v4().to_string();
            let now = started_at.to_rfc3339();
            tx.execute(
                "INSERT INTO sessions (id, started_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, now, now, now],
            )?;
            tx.commit()?;

            Ok(OpenOutcome::Opened(id))
        })
        .await
    }

    /// Stores the summary and closes the session. Returns `false` when the id
    /// is unknown.
    pub async fn close_session(&self, session_id: &str, summary: &SessionSummary) -> Result<bool> {
        let session_id = session_id.to_string();
        let summary = summary.clone();
        self.execute(move |conn| {
            let changed = conn.execute(
                "UPDATE sessions
                 SET ended_at = ?1,
                     duration_seconds = ?2,
                     max_level = ?3,
                     mean_probability = ?4,
                     total_events = ?5,
                     updated_at = ?6
                 WHERE id = ?7",
                params![
                    summary.ended_at.to_rfc3339(),
                    summary.duration_seconds,
                    summary.max_level,
                    summary.mean_probability,
                    to_i64(summary.total_events)?,
                    Utc::now().to_rfc3339(),
                    session_id,
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    pub async fn get_session_with_events(&self, session_id: &str) -> Result<Option<Session>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let Some(mut session) = find_session(conn, &session_id)? else {
                return Ok(None);
            };
            session.events = events_for_session(conn, &session_id)?;
            Ok(Some(session))
        })
        .await
    }

    /// Newest first, without event lists.
    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY started_at DESC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }
}
