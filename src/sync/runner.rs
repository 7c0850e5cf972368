//! Async driver for sync cycles.
//!
//! Fetches run as independent spawned tasks with no ordering guarantee;
//! each sends its table-tagged outcome back through an mpsc channel. The
//! loop below is the single consumer that owns the engine, so response
//! handling (and all session mutation) is serialized without locks.

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::api::ApiClient;
use crate::store::RecordStore;

use super::engine::{SyncEngine, SyncEvent};
use super::table::{FetchRequest, TableResponse};

/// Buffer for in-flight fetch outcomes; a cycle issues at most a handful of
/// requests so this never blocks senders in practice.
const CHANNEL_BUFFER_SIZE: usize = 16;

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Map a joined fetch task to its outcome. Transport failures and panicked
/// tasks are contained alike: logged, no state change, the table retries on
/// its next natural cycle.
fn fetch_outcome(
    request: FetchRequest,
    joined: Result<Result<TableResponse, crate::api::ApiError>, tokio::task::JoinError>,
) -> Option<TableResponse> {
    match joined {
        Ok(Ok(response)) => Some(response),
        Ok(Err(e)) => {
            error!(table = %request.table, error = %e, "Fetch failed");
            None
        }
        Err(e) => {
            error!(table = %request.table, error = %e, "Fetch task died");
            None
        }
    }
}

fn spawn_fetch(
    client: ApiClient,
    request: FetchRequest,
    tx: mpsc::Sender<Option<TableResponse>>,
) {
    // The fetch runs in its own task; this one only joins it and reports.
    // The sync loop counts one outcome per request, so the send must happen
    // even when the fetch panics - a lost outcome would hang the cycle.
    let fetch = tokio::spawn(async move { client.fetch(&request).await });
    tokio::spawn(async move {
        let outcome = fetch_outcome(request, fetch.await);
        if tx.send(outcome).await.is_err() {
            debug!(table = %request.table, "Sync loop gone, dropping response");
        }
    });
}

/// Run one full sync cycle to completion: issue the due requests, then feed
/// every response back into the engine until nothing is in flight.
pub async fn run_cycle(engine: &mut SyncEngine, client: &ApiClient) {
    let (tx, mut rx) = mpsc::channel::<Option<TableResponse>>(CHANNEL_BUFFER_SIZE);
    let mut in_flight = 0usize;

    for request in engine.start_cycle(now_ms()) {
        spawn_fetch(client.clone(), request, tx.clone());
        in_flight += 1;
    }

    if in_flight == 0 {
        info!("Nothing due this cycle");
        return;
    }

    while in_flight > 0 {
        let Some(outcome) = rx.recv().await else { break };
        in_flight -= 1;

        let Some(response) = outcome else { continue };
        for request in engine.handle_response(response, now_ms()) {
            spawn_fetch(client.clone(), request, tx.clone());
            in_flight += 1;
        }
    }
}

/// Push-registration check, run alongside sync requests. Success is
/// persisted so the registration happens once per install.
pub async fn check_push_registration(engine: &mut SyncEngine, client: &ApiClient) {
    let Some(token) = engine.push_registration_needed() else {
        return;
    };

    match client.register_push(&token).await {
        Ok(()) => {
            info!("Push token registered");
            engine.mark_push_registered();
        }
        Err(e) => error!(error = %e, "Push registration failed"),
    }
}

/// Drain outbound sync events, downloading any enqueued images into the
/// store's asset paths. Downloads are best-effort.
pub async fn process_events(
    engine: &SyncEngine,
    client: &ApiClient,
    events: &mut mpsc::UnboundedReceiver<SyncEvent>,
) {
    while let Ok(event) = events.try_recv() {
        match event {
            SyncEvent::SyncComplete(table) => info!(table = %table, "Sync complete"),
            SyncEvent::Purge => info!("Cached records purged"),
            SyncEvent::ImageDownload { id, url } => {
                download_image(engine.store(), client, &id, &url).await;
            }
        }
    }
}

async fn download_image(store: &RecordStore, client: &ApiClient, id: &str, url: &str) {
    match client.fetch_image(url).await {
        Ok(bytes) => {
            let path = store.image_file(id);
            if let Err(e) = std::fs::write(&path, bytes) {
                error!(path = %path.display(), error = %e, "Failed to write image");
            } else {
                debug!(id, url, "Image downloaded");
            }
        }
        Err(e) => error!(id, url, error = %e, "Image download failed"),
    }
}
