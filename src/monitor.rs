//! What the UI layer talks to: one engine, one session coordinator, and the
//! plumbing between them and the session store.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
};

use crate::analysis::{AnalysisConfig, DrowsinessEngine, EngineSnapshot, SampleError, SampleOutcome};
use crate::ledger::{spawn_forwarder, EventSender};
use crate::models::{Sample, Session, SessionSummary};
use crate::sensing::{EngineHandle, LoopStats, SensingController};
use crate::session::{review_session, SessionCoordinator, SessionPhase, SessionReview, StartOutcome};
use crate::store::SessionStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSnapshot {
    #[serde(flatten)]
    pub engine: EngineSnapshot,
    pub phase: SessionPhase,
    pub elapsed_seconds: i64,
}

pub struct Monitor {
    engine: EngineHandle,
    coordinator: SessionCoordinator,
    events_tx: EventSender,
    forwarder: JoinHandle<()>,
    sensing: Mutex<SensingController>,
}

impl Monitor {
    /// Must be called from inside a tokio runtime; the event forwarder is
    /// spawned immediately.
    pub fn new(store: Arc<dyn SessionStore>, config: AnalysisConfig) -> Self {
        let (events_tx, forwarder) = spawn_forwarder(Arc::clone(&store));
        Self {
            engine: Arc::new(Mutex::new(DrowsinessEngine::new(config))),
            coordinator: SessionCoordinator::new(store),
            events_tx,
            forwarder,
            sensing: Mutex::new(SensingController::new()),
        }
    }

    pub fn engine(&self) -> EngineHandle {
        Arc::clone(&self.engine)
    }

    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.coordinator
    }

    /// Opens (or adopts) a remote session and starts mirroring events to it.
    pub async fn start(&self) -> Result<StartOutcome> {
        let outcome = self.coordinator.start().await?;
        if let Some(session_id) = outcome.session_id() {
            self.engine
                .lock()
                .await
                .attach_session(session_id.to_string(), self.events_tx.clone());
        }
        Ok(outcome)
    }

    pub async fn process_sample(&self, sample: &Sample) -> Result<SampleOutcome, SampleError> {
        self.engine.lock().await.process(sample)
    }

    /// Submits the summary and clears all local state. `None` if no session
    /// was active, in which case nothing is touched.
    pub async fn finalize(&self) -> Option<SessionSummary> {
        let report = self.engine.lock().await.report();
        let summary = self.coordinator.finalize(&report).await?;
        self.engine.lock().await.reset();
        Some(summary)
    }

    pub async fn reset(&self) {
        self.engine.lock().await.reset();
        self.coordinator.reset().await;
        info!("monitor reset");
    }

    pub async fn snapshot(&self) -> MonitorSnapshot {
        let engine = self.engine.lock().await.snapshot();
        let state = self.coordinator.get_state().await;
        MonitorSnapshot {
            engine,
            phase: state.phase,
            elapsed_seconds: state.elapsed_seconds(Utc::now()),
        }
    }

    pub async fn start_sensing(&self, samples: mpsc::Receiver<Sample>) -> Result<()> {
        self.sensing
            .lock()
            .await
            .start_sensing(Arc::clone(&self.engine), samples)
    }

    pub async fn stop_sensing(&self) -> Result<LoopStats> {
        self.sensing.lock().await.stop_sensing().await
    }

    pub async fn drain_sensing(&self) -> Result<LoopStats> {
        self.sensing.lock().await.drain_sensing().await
    }

    /// Waits for the sample loop to finish on its own.
    pub async fn wait_sensing(&self) -> Result<LoopStats> {
        self.sensing.lock().await.join().await
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.coordinator
            .store()
            .list_sessions()
            .await
            .context("failed to list sessions")
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        self.coordinator
            .store()
            .get_session(session_id)
            .await
            .with_context(|| format!("failed to load session {session_id}"))
    }

    pub async fn review(&self, session_id: &str) -> Result<SessionReview> {
        let session = self.get_session(session_id).await?;
        Ok(review_session(&session))
    }

    /// Stops the sample loop and lets queued remote appends go out before
    /// returning.
    pub async fn shutdown(self) -> Result<()> {
        if let Err(err) = self.stop_sensing().await {
            warn!("sample loop did not stop cleanly: {err:?}");
        }

        let Monitor {
            engine,
            events_tx,
            forwarder,
            ..
        } = self;
        engine.lock().await.reset();
        drop(engine);
        drop(events_tx);

        forwarder.await.context("event forwarder failed to join")
    }
}
