use std::sync::Arc;

use tokio::{
    sync::mpsc,
    task::{JoinError, JoinHandle, JoinSet},
};

use crate::models::EventRecord;
use crate::store::SessionStore;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

pub type EventSender = mpsc::UnboundedSender<EventRecord>;

/// Drains ledger appends and sends each one to the store as its own task, so a
/// slow or failing request never holds back later events. Arrival order at the
/// store is therefore not guaranteed. Failures are logged and dropped.
///
/// The returned handle completes once every sender is gone and the appends
/// still in flight have finished.
pub fn spawn_forwarder(store: Arc<dyn SessionStore>) -> (EventSender, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<EventRecord>();

    let handle = tokio::spawn(async move {
        let mut in_flight = JoinSet::new();

        while let Some(record) = rx.recv().await {
            while let Some(joined) = in_flight.try_join_next() {
                report_panic(joined);
            }

            let store = Arc::clone(&store);
            in_flight.spawn(async move {
                if let Err(err) = store.append_event(&record).await {
                    log_warn!(
                        "failed to mirror {} for session {}: {err}",
                        record.kind,
                        record.session_id
                    );
                }
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            report_panic(joined);
        }
        log_info!("event forwarder shutting down");
    });

    (tx, handle)
}

fn report_panic(joined: Result<(), JoinError>) {
    if let Err(err) = joined {
        log_error!("event append task died: {err}");
    }
}
