//! Periodic re-read of the rooms file.
//!
//! The hosting subsystem may rewrite the file at any time. A failed read or
//! an invalid file keeps the last good catalog in service.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::rooms::RoomCatalog;

/// Run the refresh loop until `cancel` is triggered.
///
/// Returns immediately for a catalog without a backing file.
pub async fn run(catalog: Arc<RoomCatalog>, interval: Duration, cancel: CancellationToken) {
    let Some(path) = catalog.source().map(|p| p.display().to_string()) else {
        tracing::debug!("Built-in room catalog in use, refresh job not started");
        return;
    };

    tracing::info!(
        path = %path,
        interval_secs = interval.as_secs(),
        "Room catalog refresh job started"
    );

    let mut interval = tokio::time::interval(interval);
    // The catalog was loaded at startup; skip the immediate first tick.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Room catalog refresh job stopping");
                break;
            }
            _ = interval.tick() => {
                match catalog.reload().await {
                    Ok(rooms) => tracing::debug!(rooms, "Room catalog reloaded"),
                    Err(e) => tracing::warn!(
                        error = %e,
                        "Room catalog reload failed, keeping previous catalog"
                    ),
                }
            }
        }
    }
}
