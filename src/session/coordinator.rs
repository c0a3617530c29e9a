use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{error, info, warn};
use tokio::sync::Mutex;

use super::{
    state::{SessionPhase, SessionState},
    summary::{summarize, SessionReport},
};
use crate::models::SessionSummary;
use crate::store::{SessionStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The store opened a new session.
    Created(String),
    /// The store reported an already-active session for this caller; it was adopted.
    Reconciled(String),
    /// A start was already in flight or a session is running; nothing was sent.
    AlreadyRunning,
}

impl StartOutcome {
    pub fn session_id(&self) -> Option<&str> {
        match self {
            StartOutcome::Created(id) | StartOutcome::Reconciled(id) => Some(id),
            StartOutcome::AlreadyRunning => None,
        }
    }
}

/// Owns session identity and lifetime against the remote store.
#[derive(Clone)]
pub struct SessionCoordinator {
    state: Arc<Mutex<SessionState>>,
    store: Arc<dyn SessionStore>,
}

impl SessionCoordinator {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            store,
        }
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }

    pub async fn get_state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.phase
    }

    pub async fn session_id(&self) -> Option<String> {
        self.state.lock().await.session_id.clone()
    }

    /// Opens a session. Idempotent while one is starting, active or being
    /// finalized. A failure leaves the coordinator not started, so the caller
    /// may retry.
    pub async fn start(&self) -> Result<StartOutcome> {
        {
            let mut state = self.state.lock().await;
            if !state.begin_start() {
                info!("session start ignored; phase is {:?}", state.phase);
                return Ok(StartOutcome::AlreadyRunning);
            }
        }

        match self.store.create_session().await {
            Ok(session_id) => {
                self.state
                    .lock()
                    .await
                    .activate(session_id.clone(), Utc::now());
                info!("session {session_id} started");
                Ok(StartOutcome::Created(session_id))
            }
            Err(StoreError::SessionAlreadyActive { id }) => {
                warn!("store reports session {id} already active; reusing it");
                self.state.lock().await.activate(id.clone(), Utc::now());
                Ok(StartOutcome::Reconciled(id))
            }
            Err(err) => {
                self.state.lock().await.clear();
                error!("failed to start session: {err}");
                Err(anyhow!(err).context("failed to create session"))
            }
        }
    }

    /// Computes the summary from `report` and submits it. A failed submission
    /// is only logged: the local session is discarded either way and the
    /// remote summary is lost. Returns `None` when no session was active.
    pub async fn finalize(&self, report: &SessionReport) -> Option<SessionSummary> {
        let (session_id, started_at) = self.state.lock().await.begin_finalize()?;

        let summary = summarize(report, started_at, Utc::now());

        match self.store.finalize_session(&session_id, &summary).await {
            Ok(()) => info!(
                "session {session_id} finalized: {}s, max {}, mean {}, {} events",
                summary.duration_seconds,
                summary.max_level,
                summary.mean_probability,
                summary.total_events
            ),
            Err(err) => error!("failed to finalize session {session_id}: {err}"),
        }

        self.state.lock().await.clear();
        Some(summary)
    }

    /// Forgets the local session without telling the store.
    pub async fn reset(&self) {
        self.state.lock().await.clear();
    }
}
