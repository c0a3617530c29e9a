use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::loop_worker::{sensing_loop, LoopStats};
use crate::analysis::DrowsinessEngine;
use crate::models::Sample;

/// Shared engine, locked once per sample.
pub type EngineHandle = Arc<Mutex<DrowsinessEngine>>;

pub struct SensingController {
    handle: Option<JoinHandle<LoopStats>>,
    cancel_token: Option<CancellationToken>,
    drain_tx: Option<watch::Sender<bool>>,
}

impl SensingController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            drain_tx: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start_sensing(
        &mut self,
        engine: EngineHandle,
        samples: mpsc::Receiver<Sample>,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("sensing already active");
        }

        let cancel_token = CancellationToken::new();
        let (drain_tx, drain_rx) = watch::channel(false);

        let handle = tokio::spawn(sensing_loop(
            engine,
            samples,
            cancel_token.clone(),
            drain_rx,
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.drain_tx = Some(drain_tx);
        info!("sample loop started");
        Ok(())
    }

    /// Process whatever is already queued, then stop.
    pub async fn drain_sensing(&mut self) -> Result<LoopStats> {
        if let Some(tx) = self.drain_tx.take() {
            let _ = tx.send(true);
            info!("Drain signal sent to sample loop");
        }
        self.join().await
    }

    pub async fn stop_sensing(&mut self) -> Result<LoopStats> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.join().await
    }

    /// Waits for the loop to end on its own (source closed).
    pub async fn join(&mut self) -> Result<LoopStats> {
        self.cancel_token = None;
        self.drain_tx = None;
        match self.handle.take() {
            Some(handle) => handle.await.context("sample loop task failed to join"),
            None => Ok(LoopStats::default()),
        }
    }
}

impl Default for SensingController {
    fn default() -> Self {
        Self::new()
    }
}
