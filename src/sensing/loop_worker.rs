use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::controller::EngineHandle;
use crate::models::Sample;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Counts kept by one run of the sample loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopStats {
    pub accepted: u64,
    pub rejected: u64,
    pub events: u64,
}

/// Feeds samples into the engine one at a time, in arrival order.
///
/// Exits when the channel closes, when `cancel_token` fires, or, once
/// `drain_rx` flips to true, as soon as the samples already queued have been
/// processed.
pub async fn sensing_loop(
    engine: EngineHandle,
    mut samples: mpsc::Receiver<Sample>,
    cancel_token: CancellationToken,
    mut drain_rx: watch::Receiver<bool>,
) -> LoopStats {
    let mut stats = LoopStats::default();
    let mut watching_drain = true;

    loop {
        if *drain_rx.borrow() {
            while let Ok(sample) = samples.try_recv() {
                process_one(&engine, &sample, &mut stats).await;
            }
            log_info!("sample loop drained");
            break;
        }

        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("sample loop cancelled");
                break;
            }
            changed = drain_rx.changed(), if watching_drain => {
                if changed.is_err() {
                    watching_drain = false;
                }
            }
            next = samples.recv() => {
                match next {
                    Some(sample) => process_one(&engine, &sample, &mut stats).await,
                    None => {
                        log_info!("sample source closed");
                        break;
                    }
                }
            }
        }
    }

    log_info!(
        "sample loop finished: {} accepted, {} rejected, {} events",
        stats.accepted,
        stats.rejected,
        stats.events
    );
    stats
}

async fn process_one(engine: &EngineHandle, sample: &Sample, stats: &mut LoopStats) {
    let mut engine = engine.lock().await;
    match engine.process(sample) {
        Ok(outcome) => {
            stats.accepted += 1;
            stats.events += outcome.events.len() as u64;
            if !outcome.events.is_empty() {
                log_debug!(
                    "sample at {} produced {} event(s), score {}",
                    sample.captured_at,
                    outcome.events.len(),
                    outcome.score
                );
            }
        }
        Err(err) => {
            stats.rejected += 1;
            if stats.rejected == 1 {
                log_warn!("first rejected sample at {}: {err}", sample.captured_at);
            }
        }
    }
}
