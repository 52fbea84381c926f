//! Periodic purge of stale game sessions.
//!
//! A session whose last heartbeat is older than the TTL is already excluded
//! from every count; this job deletes those rows so the table stays small.
//! One short `DELETE` per tick, no in-process locks.

use std::time::Duration;

use chrono::Utc;
use lobby_core::presence::stale_cutoff;
use lobby_core::types::Timestamp;
use lobby_db::repositories::GameSessionRepo;
use lobby_db::DbPool;
use tokio_util::sync::CancellationToken;

/// Delete sessions that are stale at `now`. Returns the number purged.
pub async fn sweep_once(pool: &DbPool, ttl_secs: i64, now: Timestamp) -> Result<u64, sqlx::Error> {
    GameSessionRepo::delete_stale(pool, stale_cutoff(now, ttl_secs)).await
}

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(pool: DbPool, ttl_secs: i64, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        ttl_secs,
        interval_secs = interval.as_secs(),
        "Session sweep job started"
    );

    let mut interval = tokio::time::interval(interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweep job stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_once(&pool, ttl_secs, Utc::now()).await {
                    Ok(purged) if purged > 0 => {
                        tracing::info!(purged, "Session sweep: purged stale sessions");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Session sweep: cleanup failed");
                    }
                }
            }
        }
    }
}
