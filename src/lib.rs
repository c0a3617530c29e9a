pub mod analysis;
pub mod db;
pub mod ledger;
pub mod models;
pub mod monitor;
pub mod sensing;
pub mod session;
pub mod settings;
pub mod store;
mod utils;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use tokio::sync::mpsc;

pub use analysis::{AnalysisConfig, DrowsinessEngine, EngineSnapshot};
pub use db::Database;
pub use models::{Event, EventKind, Point, Sample, Session, SessionSummary};
pub use monitor::{Monitor, MonitorSnapshot};
pub use sensing::{LoopStats, SampleReader};
pub use session::{SessionReview, StartOutcome};
pub use settings::{MonitorSettings, SettingsStore};
pub use store::{HttpSessionStore, SessionStore, StoreError};

const REPLAY_QUEUE_DEPTH: usize = 256;

/// Reads `RUST_LOG`, defaulting to info.
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

/// The offline SQLite store when a database path is configured, the backend
/// otherwise.
pub fn build_store(settings: &MonitorSettings) -> Result<Arc<dyn SessionStore>> {
    match &settings.database_path {
        Some(path) => {
            let database = Database::new(path.clone())
                .with_context(|| format!("failed to open session database {}", path.display()))?;
            Ok(Arc::new(database))
        }
        None => {
            info!("using session backend at {}", settings.api_url);
            Ok(Arc::new(HttpSessionStore::new(
                settings.api_url.clone(),
                settings.token.clone(),
                settings.request_timeout(),
            )))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub session_id: Option<String>,
    pub stats: LoopStats,
    pub summary: Option<SessionSummary>,
}

/// Runs a recorded trace through `monitor` as one full session: start, every
/// sample in order, finalize. A trace that fails to read still finalizes the
/// session before the error is returned.
pub async fn replay_trace(monitor: &Monitor, path: &Path) -> Result<ReplayReport> {
    let reader = SampleReader::open(path).await?;

    let outcome = monitor.start().await?;
    let session_id = monitor.snapshot().await.engine.session_id;
    info!("replaying {} into session {:?} ({outcome:?})", path.display(), session_id);

    let (tx, rx) = mpsc::channel(REPLAY_QUEUE_DEPTH);
    monitor.start_sensing(rx).await?;
    let fed = reader.feed(tx).await;
    let finished = monitor.wait_sensing().await;

    // The session is closed with whatever was processed even if the trace
    // or the loop failed part way.
    let summary = monitor.finalize().await;
    let (sent, stats) = fed
        .and_then(|sent| finished.map(|stats| (sent, stats)))
        .with_context(|| format!("replay of {} aborted", path.display()))?;
    info!("fed {sent} samples");

    Ok(ReplayReport {
        session_id,
        stats,
        summary,
    })
}
