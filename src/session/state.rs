use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    #[default]
    NotStarted,
    Starting,
    Active,
    Finalizing,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub phase: SessionPhase,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the start slot. Returns `false` while a start is in flight, a
    /// session is active, or one is being finalized.
    pub fn begin_start(&mut self) -> bool {
        if self.phase != SessionPhase::NotStarted {
            return false;
        }
        self.phase = SessionPhase::Starting;
        true
    }

    pub fn activate(&mut self, session_id: String, started_at: DateTime<Utc>) {
        *self = Self {
            phase: SessionPhase::Active,
            session_id: Some(session_id),
            started_at: Some(started_at),
        };
    }

    /// Leaves the active phase. Returns the session to finalize, if there was one.
    pub fn begin_finalize(&mut self) -> Option<(String, DateTime<Utc>)> {
        if self.phase != SessionPhase::Active {
            return None;
        }
        let session_id = self.session_id.clone()?;
        let started_at = self.started_at.unwrap_or_else(Utc::now);
        self.phase = SessionPhase::Finalizing;
        Some((session_id, started_at))
    }

    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        match (self.phase, self.started_at) {
            (SessionPhase::Active | SessionPhase::Finalizing, Some(started_at)) => {
                (now - started_at).num_seconds().max(0)
            }
            _ => 0,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_slot_is_exclusive() {
        let mut state = SessionState::new();
        assert!(state.begin_start());
        assert!(!state.begin_start());

        state.activate("a".into(), Utc::now());
        assert!(!state.begin_start());
    }

    #[test]
    fn finalize_requires_active_session() {
        let mut state = SessionState::new();
        assert_eq!(state.begin_finalize(), None);

        state.activate("a".into(), Utc::now());
        assert_eq!(state.begin_finalize().map(|(id, _)| id), Some("a".to_string()));
        assert_eq!(state.phase, SessionPhase::Finalizing);
        assert!(!state.begin_start());
        assert_eq!(state.begin_finalize(), None);
    }
}
